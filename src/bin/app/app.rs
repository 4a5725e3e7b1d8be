use log::info;
use clap::{Parser, Subcommand};

use super::cmd::{kh, poly};
use super::utils::*;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct CliArgs { 
    #[command(subcommand)]
    pub command: Cmd
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    Kh(kh::Args),
    Poly(poly::Args),
}

impl CliArgs {
    // `--log` or the config's `verbosity`, whichever is higher.
    fn log_level(&self) -> log::LevelFilter { 
        let (log, config) = match &self.command {
            Cmd::Kh(args)   => (args.log, args.config.as_ref()),
            Cmd::Poly(args) => (args.log, args.config.as_ref()),
        };
        let verbosity = load_config(config).map_or(0, |c| c.verbosity);
        level_filter(log.max(verbosity))
    }
}

fn level_filter(level: u8) -> log::LevelFilter { 
    use log::LevelFilter::*;
    match level {
        0 => Off,
        1 => Info,
        2 => Debug,
        _ => Trace,
    }
}

pub struct App { 
    pub args: CliArgs
}

impl App {
    pub fn new() -> Self {
        let args = CliArgs::parse();
        App { args }
    }

    pub fn run(&self) -> Result<String, Box<dyn std::error::Error>> {
        self.init_logger();

        info!("args: {:?}", self.args);
        info!("int-type: {}", std::any::type_name::<kh_cube::Int>());

        let (res, time) = measure(||
            self.dispatch()
        );

        info!("time: {:?}", time);

        res
    }

    fn init_logger(&self) {
        use simplelog::*;
        let _ = TermLogger::init(
            self.args.log_level(),
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto
        );
    }

    fn dispatch(&self) -> Result<String, Box<dyn std::error::Error>> {
        guard_panic(||
            match &self.args.command {
                Cmd::Kh(args)   => kh::dispatch(args),
                Cmd::Poly(args) => poly::dispatch(args),
            }
        )
    }
}
