fn main() -> std::process::ExitCode {
    study_planner_lib::run()
}
