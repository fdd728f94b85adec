fn main() -> std::process::ExitCode {
    termbridge_lib::run()
}
