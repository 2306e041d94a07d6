use std::process::ExitCode;

use revscope::ui::output;

fn main() -> ExitCode {
    match revscope::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::error(format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}
