use std::process::ExitCode;

fn main() -> ExitCode {
    mcp_crew_ai::cli::main()
}
