use crate::config::DeckConfigOverrides;
use crate::oscillation::OscillationMode;
use anyhow::{anyhow, bail, Context, Result};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub struct CliOptions {
    pub config: PathBuf,
    pub report: PathBuf,
    pub script: Option<PathBuf>,
    pub seconds: f32,
    pub fps: u32,
    pub realtime: bool,
    pub overrides: DeckConfigOverrides,
}

impl Default for CliOptions {
    fn default() -> Self {
        Self {
            config: PathBuf::from("config/deck.json"),
            report: PathBuf::from("data/report.json"),
            script: None,
            seconds: 10.0,
            fps: 60,
            realtime: false,
            overrides: DeckConfigOverrides::default(),
        }
    }
}

impl CliOptions {
    pub fn parse_from_env() -> Result<Self> {
        Self::parse(env::args())
    }

    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut options = CliOptions::default();
        let mut iter = args.into_iter();
        let _ = iter.next(); // skip program name if present
        while let Some(raw_flag) = iter.next() {
            let flag = raw_flag.as_ref();
            let Some(key) = flag.strip_prefix("--") else {
                bail!("Unexpected argument '{flag}'. Flags take the form --name value.");
            };
            if key == "realtime" {
                options.realtime = true;
                continue;
            }
            let value =
                iter.next().ok_or_else(|| anyhow!("Expected a value after '{flag}'"))?.as_ref().to_string();
            match key {
                "config" => options.config = PathBuf::from(value),
                "report" => options.report = PathBuf::from(value),
                "script" => options.script = Some(PathBuf::from(value)),
                "seconds" => {
                    let seconds =
                        value.parse::<f32>().with_context(|| format!("Invalid seconds '{value}'"))?;
                    if !(seconds >= 0.0) || !seconds.is_finite() {
                        bail!("Invalid seconds '{value}'. Use a non-negative number.");
                    }
                    options.seconds = seconds;
                }
                "fps" => {
                    let fps = value.parse::<u32>().with_context(|| format!("Invalid fps '{value}'"))?;
                    if fps == 0 {
                        bail!("Invalid fps '0'. Use at least 1.");
                    }
                    options.fps = fps;
                }
                "amplitude-deg" => {
                    options.overrides.amplitude_degrees =
                        Some(value.parse::<f32>().with_context(|| format!("Invalid amplitude '{value}'"))?);
                }
                "grace-ms" => {
                    options.overrides.grace_ms =
                        Some(value.parse::<u64>().with_context(|| format!("Invalid grace '{value}'"))?);
                }
                "mode" => options.overrides.oscillation_mode = Some(parse_mode(&value)?),
                _ => bail!(
                    "Unknown flag '{flag}'. Supported flags: --config, --report, --script, --seconds, --fps, \
                     --realtime, --amplitude-deg, --grace-ms, --mode."
                ),
            }
        }
        Ok(options)
    }
}

fn parse_mode(value: &str) -> Result<OscillationMode> {
    match value.to_ascii_lowercase().as_str() {
        "bounded" | "sweep" => Ok(OscillationMode::Bounded),
        "continuous" | "drift" => Ok(OscillationMode::Continuous),
        other => bail!("Invalid mode '{other}'. Use bounded or continuous."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_paths_and_overrides() {
        let args = [
            "deck", "--report", "r.json", "--seconds", "2.5", "--fps", "30", "--mode", "drift", "--amplitude-deg",
            "90", "--realtime",
        ];
        let options = CliOptions::parse(args).expect("parse options");
        assert_eq!(options.report, PathBuf::from("r.json"));
        assert_eq!(options.seconds, 2.5);
        assert_eq!(options.fps, 30);
        assert!(options.realtime);
        assert_eq!(options.overrides.oscillation_mode, Some(OscillationMode::Continuous));
        assert_eq!(options.overrides.amplitude_degrees, Some(90.0));
    }

    #[test]
    fn latest_flag_wins() {
        let options = CliOptions::parse(["deck", "--fps", "24", "--fps", "120"]).expect("parse");
        assert_eq!(options.fps, 120);
    }

    #[test]
    fn missing_value_errors() {
        let err = CliOptions::parse(["deck", "--seconds"]).unwrap_err();
        assert!(err.to_string().contains("Expected a value"), "error should mention missing value");
    }

    #[test]
    fn rejects_unknown_flags_and_bad_values() {
        assert!(CliOptions::parse(["deck", "--foo", "bar"]).unwrap_err().to_string().contains("Unknown flag"));
        assert!(CliOptions::parse(["deck", "--fps", "0"]).is_err());
        assert!(CliOptions::parse(["deck", "--mode", "spin"]).is_err());
        assert!(CliOptions::parse(["deck", "positional"]).is_err());
    }
}
