//! Outbound mail queue.
//!
//! Confirmation messages are handed to a single background consumer through
//! a bounded channel. Enqueueing never blocks the request that triggered
//! it: a full queue drops the message with a log line. Delivery failures
//! are logged and never retried, and a successful booking is never rolled
//! back because its confirmation could not be sent.
//!
//! On shutdown, dropping the last [`MailSender`] closes the channel; the
//! consumer drains whatever was already queued, then exits.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::models::{MailData, Reservation, DATE_FMT};

/// How the queue hands a message to the outside world. The default
/// transport only logs — real delivery is an external concern.
pub trait MailTransport: Send + Sync + 'static {
    fn deliver(&self, mail: &MailData) -> Result<(), String>;
}

/// Transport that writes the message to the log instead of sending it.
#[derive(Debug, Default)]
pub struct LogTransport;

impl MailTransport for LogTransport {
    fn deliver(&self, mail: &MailData) -> Result<(), String> {
        log::info!(
            "mail to={} from={} subject={:?} ({} bytes)",
            mail.to,
            mail.from,
            mail.subject,
            mail.content.len()
        );
        Ok(())
    }
}

/// Cloneable handle for enqueueing messages.
#[derive(Clone)]
pub struct MailSender {
    tx: mpsc::Sender<MailData>,
}

impl MailSender {
    /// Queue a message without waiting. Full queue or stopped consumer:
    /// the message is dropped and the loss logged.
    pub fn enqueue(&self, mail: MailData) {
        if let Err(err) = self.tx.try_send(mail) {
            log::error!("dropping outbound mail: {}", err);
        }
    }
}

/// Start the background consumer; returns the sender handle and the task.
pub fn start_mailer<T: MailTransport>(
    transport: T,
    queue_size: usize,
) -> (MailSender, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel::<MailData>(queue_size);
    let handle = tokio::spawn(async move {
        while let Some(mail) = rx.recv().await {
            if let Err(err) = transport.deliver(&mail) {
                log::error!("mail delivery to {} failed: {}", mail.to, err);
            }
        }
        log::info!("mail queue closed, consumer exiting");
    });
    (MailSender { tx }, handle)
}

/// Confirmation message for a committed reservation.
pub fn confirmation_email(reservation: &Reservation) -> MailData {
    let content = format!(
        "<strong>Reservation Confirmation</strong><br>\
         <br>\
         Dear {}, <br>\
         This is a confirmation for your reservation of the {} from {} to {}.",
        reservation.guest.first_name,
        reservation.room_name,
        reservation.stay.start().format(DATE_FMT),
        reservation.stay.end().format(DATE_FMT),
    );
    MailData {
        to: reservation.guest.email.clone(),
        from: "server@booking.com".to_string(),
        subject: "Reservation Confirmation".to_string(),
        content,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GuestDetails, StayRange};
    use chrono::{NaiveDate, Utc};
    use std::sync::mpsc as std_mpsc;

    struct RecordingTransport(std_mpsc::Sender<MailData>);

    impl MailTransport for RecordingTransport {
        fn deliver(&self, mail: &MailData) -> Result<(), String> {
            self.0.send(mail.clone()).map_err(|e| e.to_string())
        }
    }

    fn reservation() -> Reservation {
        Reservation {
            id: 1,
            guest: GuestDetails {
                first_name: "Ada".into(),
                last_name: "Byron".into(),
                email: "ada@example.com".into(),
                phone: String::new(),
            },
            room_id: 1,
            room_name: "General's Quarters".into(),
            stay: StayRange::new(
                NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 5, 3).unwrap(),
            )
            .unwrap(),
            processed: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn queued_mail_reaches_the_transport() {
        let (recorded_tx, recorded_rx) = std_mpsc::channel();
        let (sender, handle) = start_mailer(RecordingTransport(recorded_tx), 8);

        sender.enqueue(confirmation_email(&reservation()));
        drop(sender); // close the queue so the consumer drains and exits
        handle.await.unwrap();

        let delivered: Vec<MailData> = recorded_rx.try_iter().collect();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].to, "ada@example.com");
        assert_eq!(delivered[0].subject, "Reservation Confirmation");
        assert!(delivered[0].content.contains("2024-05-01"));
    }

    #[tokio::test]
    async fn full_queue_drops_instead_of_blocking() {
        let (tx, mut rx) = mpsc::channel::<MailData>(1);
        let sender = MailSender { tx };
        // fill the only slot, then overflow — the second enqueue is dropped
        sender.enqueue(confirmation_email(&reservation()));
        sender.enqueue(confirmation_email(&reservation()));
        drop(sender);

        let mut drained = 0;
        while rx.try_recv().is_ok() {
            drained += 1;
        }
        assert_eq!(drained, 1);
    }
}
