use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message as Email, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::{config::Config, model::User};

/// One queued mentor-match email.
#[derive(Debug, Clone)]
pub struct Notification {
    pub senior_name: String,
    pub senior_email: String,
    pub junior_email: String,
    pub interest: String,
}

/// Cloneable handle over the outbound mail queue. Handlers enqueue and move
/// on; a single worker task owns the transport. Fire-and-forget: a failed
/// send is logged and dropped, never retried, never surfaced to the client.
#[derive(Clone)]
pub struct Notifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl Notifier {
    pub fn spawn<T>(transport: T, config: &Config) -> Notifier
    where
        T: AsyncTransport + Send + Sync + 'static,
        T::Error: std::error::Error + Send + Sync,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<Notification>();
        let sender = config.email_user.clone();
        let public_url = config.public_url.clone();

        tokio::spawn(async move {
            while let Some(notification) = rx.recv().await {
                let email = match build_email(&sender, &public_url, &notification) {
                    Ok(email) => email,
                    Err(e) => {
                        error!("could not build notification email: {e}");
                        continue;
                    }
                };
                match transport.send(email).await {
                    Ok(_) => info!(to = %notification.senior_email, "sent match notification"),
                    Err(e) => error!(to = %notification.senior_email, "email error: {e}"),
                }
            }
        });

        Notifier { tx }
    }

    pub fn notify_match(&self, senior: &User, junior_email: &str, interest: &str) {
        // worker gone means shutdown; nothing to do
        let _ = self.tx.send(Notification {
            senior_name: senior.name.clone(),
            senior_email: senior.email.clone(),
            junior_email: junior_email.to_owned(),
            interest: interest.to_owned(),
        });
    }
}

pub fn build_email(sender: &str, public_url: &str, n: &Notification) -> anyhow::Result<Email> {
    let from: Mailbox = if sender.is_empty() {
        "MentorLink <mentorlink@localhost>".parse()?
    } else {
        format!("MentorLink <{sender}>").parse()?
    };

    let email = Email::builder()
        .from(from)
        .to(format!("{} <{}>", n.senior_name, n.senior_email).parse()?)
        .subject("New junior interested in your domain")
        .header(ContentType::TEXT_PLAIN)
        .body(format!(
            "Hello {}, a junior selected your domain ({}).\n\
             Chat with them here: {}/chat?junior={}&senior={}",
            n.senior_name, n.interest, public_url, n.junior_email, n.senior_email
        ))?;

    Ok(email)
}

pub fn smtp_transport(config: &Config) -> anyhow::Result<AsyncSmtpTransport<Tokio1Executor>> {
    Ok(AsyncSmtpTransport::<Tokio1Executor>::relay(&config.email_relay)?
        .credentials(Credentials::new(
            config.email_user.clone(),
            config.email_pass.clone(),
        ))
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification() -> Notification {
        Notification {
            senior_name: "b".to_owned(),
            senior_email: "b@srec.ac.in".to_owned(),
            junior_email: "a@srec.ac.in".to_owned(),
            interest: "ml".to_owned(),
        }
    }

    #[test]
    fn email_names_the_interest_and_links_the_chat() {
        let email = build_email("mentor@srec.ac.in", "http://localhost:3000", &notification()).unwrap();
        let raw = String::from_utf8(email.formatted()).unwrap();
        assert!(raw.contains("your domain (ml)"));
        assert!(raw.contains("/chat?junior=a@srec.ac.in&senior=b@srec.ac.in"));
    }

    #[test]
    fn missing_sender_falls_back_to_localhost_mailbox() {
        let email = build_email("", "http://localhost:3000", &notification()).unwrap();
        let raw = String::from_utf8(email.formatted()).unwrap();
        assert!(raw.contains("mentorlink@localhost"));
    }
}
