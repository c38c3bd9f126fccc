//! Human-readable colour names.
//!
//! Naming is best effort: a namer always answers, falling back to [`NO_NAME`] when it can't find anything.

use reqwest::blocking::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// Returned whenever a colour could not be named.
pub const NO_NAME: &str = "No Name";

pub const COLOR_NAME_COM_URL: &str = "https://www.color-name.com/hex/";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const NAME_MARKER: &str = "color name is ";

/// Looks up a name for a `#rrggbb` colour code.
pub trait ColourNamer {
    fn name(&self, hex: &str) -> String;
}

impl<F> ColourNamer for F
where
    F: Fn(&str) -> String,
{
    fn name(&self, hex: &str) -> String {
        self(hex)
    }
}

/// A namer that never looks anything up.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unnamed;
impl ColourNamer for Unnamed {
    fn name(&self, _: &str) -> String {
        NO_NAME.to_string()
    }
}

/// Scrapes names from color-name.com. Every lookup is a single request; failures are not retried.
#[derive(Debug, Clone)]
pub struct ColorNameCom {
    client: Client,
    base_url: String,
}

impl ColorNameCom {
    pub fn new() -> reqwest::Result<Self> {
        Self::with_base_url(COLOR_NAME_COM_URL, DEFAULT_TIMEOUT)
    }

    /// `base_url` is joined with the six hex digits of the colour, without the leading `#`.
    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn lookup(&self, hex: &str) -> reqwest::Result<Option<String>> {
        let url = format!("{}{}", self.base_url, hex.trim_start_matches('#'));
        debug!(%url, "looking up colour name");

        let body = self.client.get(&url).send()?.error_for_status()?.text()?;
        Ok(parse_colour_name(&body))
    }
}

impl ColourNamer for ColorNameCom {
    fn name(&self, hex: &str) -> String {
        match self.lookup(hex) {
            Ok(Some(name)) => name,
            Ok(None) => {
                warn!(hex, "no colour name found in response");
                NO_NAME.to_string()
            }
            Err(e) => {
                warn!(hex, error = %e, "colour name lookup failed");
                NO_NAME.to_string()
            }
        }
    }
}

/// Pull the colour name out of a color-name.com page: the text after `color name is ` up to the next tag.
pub fn parse_colour_name(body: &str) -> Option<String> {
    let (_, rest) = body.split_once(NAME_MARKER)?;
    let name = rest.split('<').next()?.trim();

    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
