use crate::ThemePreference;
use clap::Parser;
use std::collections::HashMap;

/// Pitch Tank Console
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Override the stored theme preference for this run (and persist it).
    #[clap(long)]
    pub theme: Option<ThemePreference>,

    /// Display name to pitch under.
    #[clap(long)]
    pub name: Option<String>,

    /// Open the chat panel on startup.
    #[clap(long)]
    pub chat_open: bool,
}

impl config::Source for Args {
    fn clone_into_box(&self) -> Box<dyn config::Source + Send + Sync> {
        Box::new((*self).clone())
    }

    fn collect(&self) -> Result<config::Map<String, config::Value>, config::ConfigError> {
        let mut cache = HashMap::<String, config::Value>::new();
        if let Some(theme) = self.theme {
            cache.insert("theme".to_string(), theme.to_string().into());
        }
        if let Some(name) = &self.name {
            cache.insert("display_name".to_string(), name.clone().into());
        }
        if self.chat_open {
            cache.insert("chat_open".to_string(), true.into());
        }
        Ok(cache)
    }
}
