mod console;
mod options;
mod stub;

use console::StdConsole;
use kernel_printk::PrintkLogger;
use log::LevelFilter;
use module_lifecycle::{BuildProfile, ModuleLifecycle};
use module_redirect::{Capability, REDIRECT_TABLE, SymbolSources};
use options::{Options, ParseOutcome, USAGE};
use std::env;
use std::process::ExitCode;
use stub::{StubFips, StubLibrary};

static CONSOLE: StdConsole = StdConsole;

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let options = match options::parse(env::args().skip(1))? {
        ParseOutcome::Run(options) => options,
        ParseOutcome::Help => {
            println!("{USAGE}");
            return Ok(ExitCode::SUCCESS);
        }
    };

    let level = if options.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    PrintkLogger::new(level, &CONSOLE).init()?;

    let code = simulate(&options);
    eprintln!("modsim: init returned {code}");
    Ok(ExitCode::from(u8::try_from(code.unsigned_abs()).unwrap_or(u8::MAX)))
}

/// insmod, then rmmod if the load succeeded. Returns the init status.
fn simulate(options: &Options) -> i32 {
    let profile = BuildProfile::BUILD
        .with_integrity(options.fips)
        .with_capabilities(
            BuildProfile::BUILD
                .capabilities
                .with(Capability::FipsBoundary, options.fips),
        );

    let mut module = ModuleLifecycle::new(
        StubLibrary::new(options),
        profile,
        &REDIRECT_TABLE,
        SymbolSources::new(kernel_host::kernel_symbols()),
    )
    .with_fips(StubFips::new(options));

    match module.activate() {
        Ok(()) => {
            module.deactivate();
            0
        }
        Err(e) => {
            log::debug!("activation aborted in {:?}: {e}", module.state());
            e.host_code()
        }
    }
}
