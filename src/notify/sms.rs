use aws_sdk_sns::error::DisplayErrorContext;
use aws_sdk_sns::types::MessageAttributeValue;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::Result;
use crate::TwiqError;

const SMS_TYPE_ATTRIBUTE: &str = "AWS.SNS.SMS.SMSType";

/// SMS through SNS direct publish
#[derive(Debug)]
pub struct SmsGateway {
    enabled: bool,
    region: String,
    country_code: String,
    client: OnceCell<aws_sdk_sns::Client>,
}

impl SmsGateway {
    #[must_use]
    pub fn new(enabled: bool, region: &str, country_code: &str) -> Self {
        Self {
            enabled,
            region: region.to_string(),
            country_code: country_code.to_string(),
            client: OnceCell::new(),
        }
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// E.164 number for a local mobile number
    #[must_use]
    pub fn international(&self, number: &str) -> String {
        format!("{}{}", self.country_code, number)
    }

    async fn client(&self) -> &aws_sdk_sns::Client {
        self.client
            .get_or_init(|| async {
                let shared = super::load_aws_config(&self.region).await;
                aws_sdk_sns::Client::new(&shared)
            })
            .await
    }

    pub async fn send_sms(&self, number: &str, body: &str) -> Result<()> {
        let phone_number = self.international(number);
        if !self.enabled {
            debug!("SMS disabled, not sending to {}", phone_number);
            return Ok(());
        }

        let sms_type = MessageAttributeValue::builder()
            .data_type("String")
            .string_value("Transactional")
            .build()
            .map_err(|e| TwiqError::Notify(format!("Invalid SNS attribute: {e}")))?;

        let output = self
            .client()
            .await
            .publish()
            .phone_number(&phone_number)
            .message(body)
            .message_attributes(SMS_TYPE_ATTRIBUTE, sms_type)
            .send()
            .await
            .map_err(|e| TwiqError::Notify(format!("SNS publish failed: {}", DisplayErrorContext(&e))))?;

        debug!("SMS sent to {}: {:?}", phone_number, output.message_id());
        Ok(())
    }

    pub async fn send_otp(&self, number: &str, code: &str) -> Result<()> {
        self.send_sms(number, &otp_body(code)).await
    }

    pub async fn send_reset_otp(&self, number: &str, code: &str) -> Result<()> {
        self.send_sms(number, &reset_otp_body(code)).await
    }
}

fn otp_body(code: &str) -> String {
    format!("Use {code} to verify your Twiq account. #twiq")
}

fn reset_otp_body(code: &str) -> String {
    format!("Use {code} to reset your Twiq account password")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex;

    use super::*;

    #[test]
    fn test_message_bodies() {
        assert_eq!(otp_body("1234"), "Use 1234 to verify your Twiq account. #twiq");
        assert_eq!(reset_otp_body("9876"), "Use 9876 to reset your Twiq account password");
    }

    #[tokio::test]
    async fn test_disabled_gateway_succeeds_offline() {
        let sms = SmsGateway::new(false, "us-west-2", "+91");
        assert_eq!(sms.international("9000000000"), "+919000000000");
        sms.send_otp("9000000000", "1234").await.unwrap();
        assert!(sms.client.get().is_none());
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_disabled_gateway_keeps_codes_out_of_logs() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let sms = SmsGateway::new(false, "us-west-2", "+91");
        sms.send_otp("9000000000", "4821").await.unwrap();
        sms.send_reset_otp("9000000000", "7305").await.unwrap();

        let logs = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(logs.contains("+919000000000"), "{logs}");
        assert!(!logs.contains("4821"), "{logs}");
        assert!(!logs.contains("7305"), "{logs}");
    }
}
