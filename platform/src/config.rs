use std::{env, str::FromStr};
use crate::error::Error;

/// Environment variable choosing the [`ResizePolicy`].
pub const RESIZE_POLICY_VAR: &str = "BACKBUFFER_RESIZE";

/// What happens to the backbuffer when the window's client area changes size.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ResizePolicy {
    /// Leave the backbuffer alone, the image gets stretched from its original resolution.
    #[default]
    Keep,
    /// Reallocate the backbuffer to match the new client area.
    Reallocate,
}

impl FromStr for ResizePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keep" => Ok(ResizePolicy::Keep),
            "reallocate" => Ok(ResizePolicy::Reallocate),
            other => Err(Error::InvalidConfig(format!(
                "{}: expected \"keep\" or \"reallocate\", got {:?}",
                RESIZE_POLICY_VAR, other
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub title: String,
    pub class_name: String,
    /// Initial client area and backbuffer size.
    pub width: i32,
    pub height: i32,
    pub resize_policy: ResizePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: "GameName".to_owned(),
            class_name: "WindowClass".to_owned(),
            width: 1280,
            height: 720,
            resize_policy: ResizePolicy::Keep,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let mut config = Self::default();
        if let Some(policy) = lookup(RESIZE_POLICY_VAR) {
            config.resize_policy = policy.parse()?;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_initial_window() {
        let config = Config::default();
        assert_eq!((config.width, config.height), (1280, 720));
        assert_eq!(config.resize_policy, ResizePolicy::Keep);
    }

    #[test]
    fn resize_policy_from_lookup() {
        let config = Config::from_lookup(|_| Some(" Reallocate".to_owned())).unwrap();
        assert_eq!(config.resize_policy, ResizePolicy::Reallocate);

        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.resize_policy, ResizePolicy::Keep);

        assert!(matches!(
            Config::from_lookup(|_| Some("sometimes".to_owned())),
            Err(Error::InvalidConfig(_))
        ));
    }
}
