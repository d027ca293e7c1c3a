use serde::{Deserialize, Serialize};
use serde_json;
use std::fs;
use std::fs::File;
use std::io::prelude::*;
use std::io::Error;

/// Environment settings, backed by a settings.json file stored in the same
/// directory as the executable.
#[derive(Serialize, Deserialize, Debug)]
pub struct Configs {
    pub verbose_mode: bool,
    pub working_directory: String,
    pub max_procs: isize,
}

impl Configs {
    pub fn new() -> Configs {
        Configs {
            verbose_mode: false,
            working_directory: String::new(),
            max_procs: -1,
        }
    }
}

impl Default for Configs {
    fn default() -> Configs {
        Configs::new()
    }
}

fn settings_file() -> String {
    let mut exe_path = std::env::current_exe().unwrap_or_default();
    exe_path.pop();
    let config_file = exe_path.join("settings.json");
    config_file
        .to_str()
        .unwrap_or("settings.json")
        .to_string()
}

pub fn get_configs() -> Result<Configs, Error> {
    let configs: Configs = match fs::read_to_string(settings_file()) {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(c) => c,
            Err(_) => {
                eprintln!("Warning: settings.json could not be parsed; using default settings.");
                Configs::new()
            }
        },
        Err(_) => Configs::new(),
    };
    Ok(configs)
}

pub fn save_configs(configs: &Configs) -> Result<(), Error> {
    let configs_json =
        serde_json::to_string_pretty(&configs).expect("Error converting Configs object to JSON.");
    match File::create(settings_file()) {
        Ok(mut file) => {
            if file.write_all(configs_json.as_bytes()).is_err() {
                eprintln!("Error writing to the settings.json file, likely due to a permissions problem. Settings will not be updated.");
            }
        }
        Err(_) => {
            eprintln!("Could not create a settings.json file. The tool is likely installed somewhere without write permission.");
        }
    };

    Ok(())
}

#[cfg(test)]
mod test {
    use super::Configs;

    #[test]
    fn test_default_configs() {
        let c = Configs::new();
        assert_eq!(c.verbose_mode, false);
        assert!(c.working_directory.is_empty());
        assert_eq!(c.max_procs, -1);
    }

    #[test]
    fn test_configs_round_trip_json() {
        let c = Configs {
            verbose_mode: true,
            working_directory: "/data/dems/".to_string(),
            max_procs: 4,
        };
        let s = serde_json::to_string(&c).unwrap();
        let c2: Configs = serde_json::from_str(&s).unwrap();
        assert_eq!(c2.verbose_mode, true);
        assert_eq!(c2.working_directory, "/data/dems/");
        assert_eq!(c2.max_procs, 4);
    }
}
