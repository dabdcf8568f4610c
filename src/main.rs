use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use fwcutter::{Cli, CutterError, FwCutter, OutputFormatter, OutputMode};
use std::process;

fn main() {
    let exit_code = run();
    process::exit(exit_code);
}

fn run() -> i32 {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => return handle_parse_error(e),
    };

    let cutter = match FwCutter::from_cli(&cli) {
        Ok(cutter) => cutter,
        Err(e) => {
            print_startup_error(&e);
            return e.exit_code();
        }
    };

    let result = if cli.dry_run {
        cutter.inspect(&cli.driver)
    } else {
        cutter.extract(&cli.driver, &cli.output)
    };

    match result {
        Ok(report) => {
            cutter.output_formatter().print_extraction_report(&report);
            0
        }
        Err(e) => {
            cutter.handle_error(&e);
            e.exit_code()
        }
    }
}

fn handle_parse_error(error: clap::Error) -> i32 {
    match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => error.exit(),
        _ => {
            // usage goes to stdout, the parse error itself to stderr
            eprintln!("{}", error.render());
            println!("{}", Cli::command().render_usage());
            1
        }
    }
}

fn print_startup_error(error: &CutterError) {
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}
