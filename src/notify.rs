//! Outbound notifications. Delivery is best-effort: callers hand a
//! [`Notification`] to [`send_best_effort`] after their write has committed
//! and never observe the outcome.

use std::fmt::Write as _;

use anyhow::Context;
use async_trait::async_trait;
use chrono::Days;
use serde::Serialize;

use crate::models::{Order, OrderStatus, User};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone)]
pub enum Notification {
    /// Tells the order's creator about an HOD decision.
    StatusChanged { order: Order, recipient: User },
    /// Asks the vendor to quote for the order's items.
    QuotationRequest { order: Order, requested_by: User },
}

impl Notification {
    /// `None` when there is nobody to address, e.g. a vendor without email.
    pub fn render(&self, from: &str) -> Option<EmailMessage> {
        match self {
            Notification::StatusChanged { order, recipient } => Some(EmailMessage {
                from: from.to_string(),
                to: recipient.email.clone(),
                subject: format!(
                    "Order {} {}",
                    order.gin_details.gin_number,
                    status_label(order.status)
                ),
                body: status_body(order, recipient),
            }),
            Notification::QuotationRequest { order, requested_by } => {
                let to = order.vendor_details.email.clone()?;
                Some(EmailMessage {
                    from: from.to_string(),
                    to,
                    subject: format!("Quotation Request - {}", order.gin_details.gin_number),
                    body: quotation_body(order, requested_by),
                })
            }
        }
    }
}

fn status_label(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Pending => "is pending",
        OrderStatus::Approved => "approved",
        OrderStatus::Rejected => "rejected",
        OrderStatus::ChangesRequested => "needs changes",
        OrderStatus::QuotationRequested => "awaits a vendor quotation",
    }
}

fn status_body(order: &Order, recipient: &User) -> String {
    let mut body = format!(
        "Dear {},\n\nYour order {} ({}) for {} totalling INR {:.2} {}.\n",
        recipient.full_name,
        order.gin_details.gin_number,
        order.gin_details.department,
        order.vendor_details.name,
        order.total_price,
        status_label(order.status),
    );
    if let Some(changes) = &order.requested_changes {
        let _ = write!(body, "\nRequested changes: {changes}\n");
    }
    body.push_str("\nStore Management System\n");
    body
}

fn quotation_body(order: &Order, requested_by: &User) -> String {
    let mut body = format!(
        "Dear {},\n\nWe kindly request your quotation for the following items \
         (ref {} | {}):\n\n",
        order.vendor_details.name, order.gin_details.gin_number, order.gin_details.department,
    );
    let _ = writeln!(body, "{:<24} {:<24} {:>6} {:>12} {:>12}", "Item", "Description", "Qty", "Unit Price", "Total");
    for item in &order.items {
        let description = if item.description.is_empty() {
            "-"
        } else {
            item.description.as_str()
        };
        let _ = writeln!(
            body,
            "{:<24} {:<24} {:>6} {:>12.2} {:>12.2}",
            item.name,
            description,
            item.quantity,
            item.unit_price,
            item.line_total().unwrap_or_default()
        );
    }
    body.push_str(
        "\nPlease include detailed pricing, delivery schedule and terms, \
         quotation validity period, and GST and other applicable taxes.\n",
    );
    if let Some(due) = order.gin_details.date.checked_add_days(Days::new(7)) {
        let _ = writeln!(body, "\nRequired by: {}", due.format("%B %-d, %Y"));
    }
    let _ = write!(body, "\nBest regards,\n{}\n", requested_by.full_name);
    if let Some(department) = requested_by.department {
        let _ = writeln!(body, "{department}");
    }
    body
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, message: &EmailMessage) -> anyhow::Result<()>;
}

/// Writes messages to the log instead of sending them.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn deliver(&self, message: &EmailMessage) -> anyhow::Result<()> {
        tracing::info!(to = %message.to, subject = %message.subject, "notification");
        Ok(())
    }
}

/// Posts each message as JSON to a mail relay.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn deliver(&self, message: &EmailMessage) -> anyhow::Result<()> {
        self.client
            .post(&self.url)
            .json(message)
            .send()
            .await
            .context("notification relay unreachable")?
            .error_for_status()
            .context("notification relay rejected message")?;
        Ok(())
    }
}

/// Renders and delivers one notification, logging instead of failing.
pub async fn send_best_effort(notifier: &dyn Notifier, from: &str, notification: Notification) {
    let Some(message) = notification.render(from) else {
        tracing::debug!("notification has no recipient, skipped");
        return;
    };
    if let Err(err) = notifier.deliver(&message).await {
        tracing::warn!(error = %err, to = %message.to, "notification failed");
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use super::*;
    use crate::models::{
        Department, GinDetails, NewOrder, OrderItem, OrderLines, Role, VendorDetails,
    };

    fn user(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            full_name: "Asha Patil".into(),
            email: "asha@college.edu".into(),
            password_hash: String::new(),
            role,
            department: Some(Department::Civil),
            created_at: Utc::now(),
        }
    }

    fn order(vendor_email: Option<&str>) -> Order {
        Order::create(
            NewOrder {
                gin_details: GinDetails {
                    gin_number: "GIN-42".into(),
                    date: NaiveDate::from_ymd_opt(2024, 3, 28).unwrap(),
                    department: Department::Civil,
                    bill_number: "B-7".into(),
                },
                vendor_details: VendorDetails {
                    name: "Acme Traders".into(),
                    contact_number: "9999999999".into(),
                    gstin: "22ABCDE1234F1Z5".into(),
                    address: "Kolhapur".into(),
                    email: vendor_email.map(str::to_string),
                },
                items: OrderLines::new(vec![OrderItem {
                    name: "Cement".into(),
                    description: String::new(),
                    quantity: 4,
                    unit_price: Decimal::new(3505, 1),
                }])
                .unwrap(),
            },
            Uuid::new_v4(),
            Utc::now(),
        )
    }

    #[test]
    fn status_mail_goes_to_creator_with_requested_changes() {
        let mut order = order(None);
        order.apply_action(crate::models::OrderAction::RequestChanges, Some("fix qty"), Uuid::new_v4());
        let recipient = user(Role::StoreManager);

        let message = Notification::StatusChanged {
            order,
            recipient: recipient.clone(),
        }
        .render("no-reply@storemgmt.com")
        .unwrap();

        assert_eq!(message.to, recipient.email);
        assert_eq!(message.subject, "Order GIN-42 needs changes");
        assert!(message.body.contains("Requested changes: fix qty"));
        assert!(message.body.contains("INR 1402.00"));
    }

    #[test]
    fn quotation_request_needs_vendor_email() {
        let hod = user(Role::Hod);
        assert!(
            Notification::QuotationRequest {
                order: order(None),
                requested_by: hod.clone(),
            }
            .render("x@y")
            .is_none()
        );

        let message = Notification::QuotationRequest {
            order: order(Some("sales@acme.test")),
            requested_by: hod,
        }
        .render("x@y")
        .unwrap();
        assert_eq!(message.to, "sales@acme.test");
        assert_eq!(message.subject, "Quotation Request - GIN-42");
        assert!(message.body.contains("Required by: April 4, 2024"));
        assert!(message.body.contains("Cement"));
    }
}
