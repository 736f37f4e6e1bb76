use clap::ArgMatches;

use undertaker::{cnf::builder::ConstantPolicy, config::Config};

pub fn config_from_args(args: &ArgMatches) -> Config {
    let mut the_config = Config::default();

    if let Ok(Some(secs)) = args.try_get_one::<u64>("time_limit") {
        the_config.time_limit.value = std::time::Duration::from_secs(*secs)
    };

    if let Ok(Some(policy)) = args.try_get_one::<String>("constant_policy") {
        the_config.constant_policy.value = match policy.as_str() {
            "bound" => ConstantPolicy::Bound,
            _ => ConstantPolicy::Free,
        }
    };

    if let Ok(Some(true)) = args.try_get_one::<bool>("no_simplify") {
        the_config.simplify.value = false
    };

    if let Ok(Some(value)) = args.try_get_one::<bool>("crosscheck") {
        the_config.crosscheck.value = *value
    };

    if let Ok(Some(jobs)) = args.try_get_one::<usize>("jobs") {
        the_config.jobs.value = (*jobs).clamp(the_config.jobs.min, the_config.jobs.max)
    };

    the_config
}
