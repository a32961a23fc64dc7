use aws_sdk_sesv2::error::DisplayErrorContext;
use aws_sdk_sesv2::types::Body;
use aws_sdk_sesv2::types::Content;
use aws_sdk_sesv2::types::Destination;
use aws_sdk_sesv2::types::EmailContent;
use aws_sdk_sesv2::types::Message;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::models::FeedbackType;
use crate::Result;
use crate::TwiqError;

/// SES limit on recipients per message
pub const MAX_RECIPIENTS: usize = 50;

const CHARSET: &str = "UTF-8";

/// E-mail through SES v2, sent from the configured info address
#[derive(Debug)]
pub struct Mailer {
    enabled: bool,
    region: String,
    info_email: String,
    client: OnceCell<aws_sdk_sesv2::Client>,
}

fn content(data: &str) -> Result<Content> {
    Content::builder()
        .data(data)
        .charset(CHARSET)
        .build()
        .map_err(|e| TwiqError::Notify(format!("Invalid e-mail content: {e}")))
}

impl Mailer {
    #[must_use]
    pub fn new(enabled: bool, region: &str, info_email: &str) -> Self {
        Self {
            enabled,
            region: region.to_string(),
            info_email: info_email.to_string(),
            client: OnceCell::new(),
        }
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub fn info_email(&self) -> &str {
        &self.info_email
    }

    async fn client(&self) -> &aws_sdk_sesv2::Client {
        self.client
            .get_or_init(|| async {
                let shared = super::load_aws_config(&self.region).await;
                aws_sdk_sesv2::Client::new(&shared)
            })
            .await
    }

    /// # Errors
    /// - `Notify` when `to` has more than [`MAX_RECIPIENTS`] addresses
    /// - `Notify` when SES rejects the request
    pub async fn send_email(
        &self,
        from: &str,
        to: &[String],
        subject: &str,
        text: &str,
        html: &str,
    ) -> Result<()> {
        if to.len() > MAX_RECIPIENTS {
            return Err(TwiqError::Notify(
                "Cannot send more than 50 emails at once.".to_string(),
            ));
        }
        // Recipients and bodies stay out of the log
        debug!("E-mail from {} to {} recipients: {}", from, to.len(), subject);
        if !self.enabled {
            debug!("E-mail disabled, not sending");
            return Ok(());
        }

        let message = Message::builder()
            .subject(content(subject)?)
            .body(Body::builder().text(content(text)?).html(content(html)?).build())
            .build();
        let destination = Destination::builder()
            .set_to_addresses(Some(to.to_vec()))
            .build();

        self.client()
            .await
            .send_email()
            .from_email_address(from)
            .destination(destination)
            .content(EmailContent::builder().simple(message).build())
            .send()
            .await
            .map_err(|e| TwiqError::Notify(format!("SES send failed: {}", DisplayErrorContext(&e))))?;
        Ok(())
    }

    pub async fn verification_email(&self, email: &str, first_name: &str, code: &str) -> Result<()> {
        let (subject, text, html) = verification_message(first_name, code);
        self.send_email(&self.info_email, &[email.to_string()], subject, &text, &html)
            .await
    }

    pub async fn forgot_password_email(
        &self,
        email: &str,
        first_name: &str,
        code: &str,
    ) -> Result<()> {
        let subject = "Twiq - Resetting the account password";
        let body = format!(
            "Hello {first_name} , \n Your reset token is {code}.\n Please enter the above code in the reset screen"
        );
        self.send_email(&self.info_email, &[email.to_string()], subject, &body, &body)
            .await
    }

    /// Forward user feedback to the info address
    pub async fn feedback_email(
        &self,
        phone: &str,
        feedback_type: FeedbackType,
        description: &str,
    ) -> Result<()> {
        let subject = format!("Twiq - {} from {phone}", feedback_type.as_str());
        let html = format!(
            "<b>{}</b> from {}<br><br>{}",
            feedback_type.as_str(),
            phone,
            description.replace('\n', "<br>")
        );
        self.send_email(
            &self.info_email,
            &[self.info_email.clone()],
            &subject,
            description,
            &html,
        )
        .await
    }
}

fn verification_message(first_name: &str, code: &str) -> (&'static str, String, String) {
    let html = format!(
        "Hello {first_name},<br><br>Welcome to Twiq.<br>You can verify your Twiq account by \
         <b><a href='https://twiq.in/api/vr?token={code}' target='_blank'>clicking here</a></b>.\
         <br><br>If the above link did not work, you can manually enter the below code in Twiq App.\
         <br>Code: <b>{code}</b><br>"
    );
    let text = format!(
        "Hello {first_name},\n\nWelcome to Twiq.\nYou can verify your Twiq account by entering \
         the code below in Twiq App.\nCode: {code}\n"
    );
    ("Twiq - Verify your account", text, html)
}
