use crate::domain::errors::DomainError;
use crate::domain::ports::Mailer;

/// Mailer that only logs the outbound message. Actual delivery belongs to
/// an external service behind the `Mailer` port; this implementation keeps
/// the seam without pulling in a transport.
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), DomainError> {
        log::info!("outbound mail to {to}: {subject}");
        log::debug!("{body}");
        Ok(())
    }
}
