use iterast::config::ConfigWarning;

pub fn print_config_warnings(warnings: &[ConfigWarning]) {
    for warning in warnings {
        eprintln!("{warning}");
    }
}
