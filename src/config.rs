use std::path::PathBuf;

use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub port: u16,
    pub data_dir: PathBuf,
    /// Base URL used for the chat link in notification emails.
    pub public_url: String,
    /// Only addresses under this domain may register.
    pub allowed_email_domain: String,
    pub email_user: String,
    pub email_pass: String,
    pub email_relay: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            data_dir: PathBuf::from("data"),
            public_url: "http://localhost:3000".to_owned(),
            allowed_email_domain: "srec.ac.in".to_owned(),
            email_user: String::new(),
            email_pass: String::new(),
            email_relay: "smtp.gmail.com".to_owned(),
        }
    }
}

impl Config {
    /// Defaults, overridden by `mentorlink.json` if present, overridden by
    /// the environment (`PORT`, `EMAIL_USER`, `EMAIL_PASS`, ...).
    pub fn load() -> Result<Config, figment::Error> {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Json::file("mentorlink.json"))
            .merge(Env::prefixed("").only(&[
                "port",
                "data_dir",
                "public_url",
                "allowed_email_domain",
                "email_user",
                "email_pass",
                "email_relay",
            ]))
            .extract()
    }

    /// Without SMTP credentials the mail worker runs on a stub transport.
    pub fn mail_enabled(&self) -> bool {
        !self.email_user.is_empty()
    }
}
