//! Entrypoint for CLI
mod config;
mod error;
mod headless;
mod keymap;

use std::{env, fs, time::Instant};

use chip8::{prelude::*, Clock, IMPL_VERSION};
use log::{error, info};

use self::{config::RunConfig, error::CliError, headless::Headless};

static USAGE: &str = r#"
usage: chip8 CMD FILE [OPTIONS]

commands:
    run     Run the target ROM file without a window, and print the final display
    dis     Disassemble the target ROM into readable assembly

run options:
    --config FILE   YAML run configuration
    --frames N      Number of frames to run
    --hold KEYS     Host keys held down for the whole run, mapped through the keymap
    --seed N        Seed for the random number generator
    --unthrottled   Run frames back to back instead of at the refresh rate

examples:
    chip8 run breakout.ch8 --frames 300 --hold q
    chip8 dis breakout.ch8
"#;

fn run_bytecode(opts: RunOpts) -> Result<(), CliError> {
    let mut config = match opts.config {
        Some(ref filepath) => RunConfig::from_file(filepath)?,
        None => RunConfig::default(),
    };
    if let Some(frames) = opts.frames {
        config.frames = frames;
    }
    if opts.seed.is_some() {
        config.seed = opts.seed;
    }
    config.unthrottled |= opts.unthrottled;

    let held = match opts.hold {
        Some(ref keys) => config
            .key_map()
            .map_keys(keys)
            .map_err(|key| CliError::usage(format!("no keypad key is bound to {key:?}")))?,
        None => Vec::new(),
    };

    let mut vm = Chip8Vm::new(config.chip8_conf());
    vm.load_file(&opts.filepath)?;

    let (width, height) = Chip8Vm::dimensions();
    info!(
        "running {} for {} frames, {}x{} display, {} instructions per frame",
        opts.filepath,
        config.frames,
        width,
        height,
        vm.config().cycles_per_frame()
    );

    let mut devices = Headless::with_held_keys(held);
    let mut clock = Clock::new(vm.config().frame_interval());

    let start = Instant::now();
    let mut result = Ok(());
    for _ in 0..config.frames {
        result = vm.run_frame(&mut devices);
        if result.is_err() {
            break;
        }
        if !config.unthrottled {
            clock.wait();
        }
    }
    let end = Instant::now();

    info!(
        "ran {} frames in {}ms, buzzer on for {} frames",
        devices.frames(),
        end.duration_since(start).as_nanos() as f64 / 1000000.0, // to millis
        devices.buzz_frames()
    );
    println!("{}", vm.dump_display()?);

    if let Err(err) = result {
        let pc = vm.cpu().pc() as usize;
        println!("{}", vm.dump_ram(8 + pc.saturating_sub(0x200))?);
        return Err(err.into());
    }

    Ok(())
}

fn run_disassembler(filepath: impl AsRef<str>) -> Result<(), CliError> {
    info!("running disassembler");

    let bytecode = fs::read(filepath.as_ref())?;

    let mut listing = String::new();
    Disassembler::new(&bytecode).disassemble(&mut listing)?;
    print!("{listing}");

    Ok(())
}

fn main() {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .env()
        .init()
        .expect("logger is only initialised once");

    let result = match parse_args(env::args().skip(1)) {
        Ok(Cmd::Run(opts)) => run_bytecode(opts),
        Ok(Cmd::Dis { filepath }) => run_disassembler(filepath),
        Err(err) => Err(err),
    };

    if let Err(err) = result {
        error!("{err}");
        if matches!(err.kind, error::ErrorKind::Usage(_)) {
            print_usage();
        }
        std::process::exit(err.exit_code())
    }
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Cmd, CliError> {
    let cmd = args
        .next()
        .ok_or_else(|| CliError::usage("missing command"))?;

    match cmd.as_str() {
        "run" => {
            let mut opts = RunOpts {
                filepath: consume_arg(&mut args, "FILE")?,
                config: None,
                frames: None,
                hold: None,
                seed: None,
                unthrottled: false,
            };

            while let Some(arg) = args.next() {
                // don't format me T.T
                match arg.as_str() {
                    "--config" => opts.config = Some(consume_arg(&mut args, "--config")?),
                    "--frames" => opts.frames = Some(parse_num(&mut args, "--frames")?),
                    "--hold" => opts.hold = Some(consume_arg(&mut args, "--hold")?),
                    "--seed" => opts.seed = Some(parse_num(&mut args, "--seed")?),
                    "--unthrottled" => opts.unthrottled = true,
                    other => return Err(CliError::usage(format!("unknown option {other}"))),
                }
            }

            Ok(Cmd::Run(opts))
        }
        "dis" => Ok(Cmd::Dis {
            filepath: consume_arg(&mut args, "FILE")?,
        }),
        other => Err(CliError::usage(format!("unknown command {other}"))),
    }
}

/// Consumes the next argument, failing with a usage error if it doesn't exist.
fn consume_arg(args: &mut impl Iterator<Item = String>, name: &str) -> Result<String, CliError> {
    args.next()
        .ok_or_else(|| CliError::usage(format!("missing value for {name}")))
}

fn parse_num<T: std::str::FromStr>(
    args: &mut impl Iterator<Item = String>,
    name: &str,
) -> Result<T, CliError> {
    let value = consume_arg(args, name)?;
    value
        .parse()
        .map_err(|_| CliError::usage(format!("{name} expects a number, got {value:?}")))
}

fn print_usage() {
    println!("Chip8 v{IMPL_VERSION}");
    println!("{USAGE}");
}

#[derive(Debug)]
struct RunOpts {
    filepath: String,
    config: Option<String>,
    frames: Option<usize>,
    hold: Option<String>,
    seed: Option<u64>,
    unthrottled: bool,
}

#[derive(Debug)]
enum Cmd {
    /// Run file
    Run(RunOpts),
    /// Disassemble
    Dis { filepath: String },
}
