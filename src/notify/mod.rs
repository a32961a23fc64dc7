//! Outbound SMS and e-mail through AWS
//!
//! Both gateways are switched off by default. A disabled gateway logs the
//! message at debug level and reports success without touching the network.
//! AWS clients are built on first use, so a disabled deployment never loads
//! AWS credentials.

use aws_config::BehaviorVersion;
use aws_config::Region;
use aws_config::SdkConfig;

use crate::config::NotifyConfig;

mod email;
mod sms;

pub use email::Mailer;
pub use email::MAX_RECIPIENTS;
pub use sms::SmsGateway;

async fn load_aws_config(region: &str) -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .load()
        .await
}

/// Both gateways, built from `[notify]`
#[derive(Debug)]
pub struct Notifier {
    pub sms: SmsGateway,
    pub mail: Mailer,
}

impl Notifier {
    #[must_use]
    pub fn from_config(config: &NotifyConfig) -> Self {
        Self {
            sms: SmsGateway::new(
                config.sms_enabled,
                &config.aws_region,
                &config.sms_country_code,
            ),
            mail: Mailer::new(config.email_enabled, &config.aws_region, &config.info_email),
        }
    }

    /// Gateways that only log
    #[must_use]
    pub fn disabled() -> Self {
        Self::from_config(&NotifyConfig::default())
    }
}
