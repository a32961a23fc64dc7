//! Request input validation
//!
//! Every check is pure: raw form strings go in, typed values or a
//! [`TwiqError::Validation`] carrying the client-facing message come out.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::CardType;
use crate::models::Post;
use crate::TwiqError;
use crate::Result;

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[a-z0-9._%+\-]+@[a-z0-9.\-]+\.[a-z]{2,4}$").expect("email regex");
    static ref PHONE_RE: Regex = Regex::new(r"^[789]\d{9}$").expect("phone regex");
}

pub const MIN_PASSWORD_LEN: usize = 8;

/// Feed cursor direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFlag {
    /// Newest page
    Top,
    /// Page strictly older than the cursor
    Before,
    /// Page strictly newer than the cursor
    After,
}

impl FeedFlag {
    #[must_use]
    pub const fn from_i32(v: i32) -> Option<Self> {
        match v {
            1 => Some(Self::Top),
            2 => Some(Self::Before),
            3 => Some(Self::After),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_i32(self) -> i32 {
        match self {
            Self::Top => 1,
            Self::Before => 2,
            Self::After => 3,
        }
    }
}

/// Parsed `/feed` request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedQuery {
    pub last_sync: i64,
    pub mascot_id: i32,
    pub flag: FeedFlag,
}

/// Raw `/post` form fields
#[derive(Debug, Clone, Default)]
pub struct PostForm {
    pub card_type: String,
    pub src: String,
    pub dp_src: String,
    pub title: String,
    pub description: String,
    pub button_text: String,
    pub url: String,
    pub icon: String,
    pub gradient_start: String,
    pub gradient_end: String,
    pub child_posts: Vec<String>,
}

impl PostForm {
    /// Collect fields from url-encoded pairs; `ChildPosts` may repeat
    #[must_use]
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let mut form = Self::default();
        for (key, value) in pairs {
            let value = value.clone();
            match key.as_str() {
                "CardType" => form.card_type = value,
                "Src" => form.src = value,
                "DpSrc" => form.dp_src = value,
                "Title" => form.title = value,
                "Description" => form.description = value,
                "ButtonText" => form.button_text = value,
                "Url" => form.url = value,
                "Icon" => form.icon = value,
                "GradientStart" => form.gradient_start = value,
                "GradientEnd" => form.gradient_end = value,
                "ChildPosts" => form.child_posts.push(value),
                _ => {}
            }
        }
        form
    }
}

fn invalid(msg: &str) -> TwiqError {
    TwiqError::Validation(msg.to_string())
}

#[must_use]
pub fn is_valid_phone(raw: &str) -> bool {
    PHONE_RE.is_match(raw)
}

#[must_use]
pub fn is_valid_email(raw: &str) -> bool {
    EMAIL_RE.is_match(&raw.to_lowercase())
}

/// Lowercased e-mail address
pub fn email(raw: &str) -> Result<String> {
    let lowered = raw.to_lowercase();
    if EMAIL_RE.is_match(&lowered) {
        Ok(lowered)
    } else {
        Err(invalid("Invalid email address."))
    }
}

/// Ten-digit Indian mobile number
pub fn phone(raw: &str) -> Result<String> {
    if is_valid_phone(raw) {
        Ok(raw.to_string())
    } else {
        Err(invalid("Invalid phone number."))
    }
}

pub fn password(raw: &str) -> Result<()> {
    if raw.chars().count() < MIN_PASSWORD_LEN {
        return Err(invalid("Password should be atleast 8 chars"));
    }
    Ok(())
}

pub fn login(raw_phone: &str, raw_password: &str) -> Result<(String, String)> {
    let phone = phone(raw_phone)?;
    password(raw_password)?;
    Ok((phone, raw_password.to_string()))
}

pub fn initiate_signup(raw_phone: &str) -> Result<String> {
    phone(raw_phone)
}

/// Validated `/signup` fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUp {
    pub phone: String,
    pub code: String,
    pub name: String,
    pub password: String,
}

pub fn signup(raw_phone: &str, code: &str, name: &str, raw_password: &str) -> Result<SignUp> {
    let phone = phone(raw_phone)?;
    if code.is_empty() {
        return Err(invalid("OTP code cannot be empty"));
    }
    if name.is_empty() {
        return Err(invalid("Name cannot be empty"));
    }
    password(raw_password)?;
    Ok(SignUp {
        phone,
        code: code.to_string(),
        name: name.to_string(),
        password: raw_password.to_string(),
    })
}

/// Parse the three `/feed` parameters
///
/// # Errors
/// Returns a validation error when any value is empty, non-numeric, or the
/// flag is not one of Top (1), Before (2), After (3).
pub fn feed(last_sync: &str, mascot_id: &str, flag: &str) -> Result<FeedQuery> {
    let last_sync: i64 = last_sync
        .parse()
        .map_err(|_| invalid("lastSync is not a valid Integer"))?;
    let mascot_id: i32 = mascot_id
        .parse()
        .map_err(|_| invalid("mascotId is not a valid Integer"))?;
    let flag: i32 = flag
        .parse()
        .map_err(|_| invalid("flag is not a valid Integer"))?;
    let flag = FeedFlag::from_i32(flag).ok_or_else(|| invalid("Invalid value for flag"))?;

    Ok(FeedQuery {
        last_sync,
        mascot_id,
        flag,
    })
}

/// Check a post form against the rules of its card type
pub fn create_post(form: &PostForm) -> Result<Post> {
    let card_type: i32 = form
        .card_type
        .parse()
        .map_err(|_| invalid("Invalid cardType"))?;
    let card = CardType::from_i32(card_type).ok_or_else(|| invalid("Invalid cardType value"))?;

    if form.title.is_empty() {
        return Err(invalid("Title cannot be empty"));
    }

    if card.carries_media() {
        if form.dp_src.is_empty() {
            return Err(invalid("DpSrc cannot be empty for datacard"));
        }
        if form.src.is_empty() {
            return Err(invalid("Src cannot be empty for datacard"));
        }
    }

    if card == CardType::Article {
        if form.button_text.is_empty() {
            return Err(invalid("ButtonText cannot be empty for articleCard"));
        }
        if form.url.is_empty() {
            return Err(invalid("Url cannot be empty for articleCard"));
        }
    }

    if card == CardType::List {
        if form.child_posts.is_empty() {
            return Err(invalid("ChildPosts cannot be empty for ListCard"));
        }
        if form.icon.is_empty() || form.gradient_start.is_empty() || form.gradient_end.is_empty() {
            return Err(invalid(
                "Icon, GradientStart, GradientEnd cannot be empty for ListCard",
            ));
        }
    }

    Ok(Post {
        card_type,
        src: form.src.clone(),
        dp_src: form.dp_src.clone(),
        title: form.title.clone(),
        description: form.description.clone(),
        button_text: form.button_text.clone(),
        url: form.url.clone(),
        icon: form.icon.clone(),
        gradient_start: form.gradient_start.clone(),
        gradient_end: form.gradient_end.clone(),
        child_posts: form.child_posts.clone(),
        ..Post::default()
    })
}

pub fn payment(order_id: &str) -> Result<i32> {
    order_id
        .parse()
        .map_err(|_| invalid("orderId is not a valid Integer"))
}

/// Parse an integer form field, naming the field in the error
pub fn int_field<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.parse()
        .map_err(|_| TwiqError::Validation(format!("{name} is not a valid Integer")))
}

/// 24 lowercase or uppercase hex characters
pub fn object_id(raw: &str) -> Result<String> {
    if raw.len() == 24 && raw.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(raw.to_lowercase())
    } else {
        Err(invalid("Invalid Id"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article_form() -> PostForm {
        PostForm {
            card_type: "1".into(),
            src: "a.png".into(),
            dp_src: "dp.png".into(),
            title: "Title".into(),
            button_text: "Read".into(),
            url: "https://twiq.in".into(),
            ..PostForm::default()
        }
    }

    #[test]
    fn test_article_requires_button_and_url() {
        assert!(create_post(&article_form()).is_ok());

        let mut form = article_form();
        form.url.clear();
        let err = create_post(&form).unwrap_err();
        assert_eq!(err.to_string(), "Url cannot be empty for articleCard");
    }

    #[test]
    fn test_date_separator_needs_only_title() {
        let form = PostForm {
            card_type: "3".into(),
            title: "Monday".into(),
            ..PostForm::default()
        };
        let post = create_post(&form).unwrap();
        assert_eq!(post.card_type, 3);
        assert!(post.src.is_empty());
    }

    #[test]
    fn test_list_card_rules() {
        let mut form = PostForm {
            card_type: "4".into(),
            title: "Best of".into(),
            icon: "i.png".into(),
            gradient_start: "#000".into(),
            gradient_end: "#fff".into(),
            ..PostForm::default()
        };
        assert_eq!(
            create_post(&form).unwrap_err().to_string(),
            "ChildPosts cannot be empty for ListCard"
        );
        form.child_posts.push("5a1b2c3d4e5f60718293a4b5".into());
        assert_eq!(create_post(&form).unwrap().child_posts.len(), 1);
    }

    #[test]
    fn test_unknown_card_type() {
        let form = PostForm {
            card_type: "9".into(),
            title: "x".into(),
            ..PostForm::default()
        };
        assert_eq!(create_post(&form).unwrap_err().to_string(), "Invalid cardType value");
    }

    #[test]
    fn test_from_pairs_collects_repeated_children() {
        let pairs = vec![
            ("CardType".to_string(), "4".to_string()),
            ("ChildPosts".to_string(), "a".to_string()),
            ("ChildPosts".to_string(), "b".to_string()),
            ("Ignored".to_string(), "z".to_string()),
        ];
        let form = PostForm::from_pairs(&pairs);
        assert_eq!(form.card_type, "4");
        assert_eq!(form.child_posts, vec!["a", "b"]);
    }

    #[test]
    fn test_signup_order_of_checks() {
        assert_eq!(
            signup("9000000000", "", "", "short").unwrap_err().to_string(),
            "OTP code cannot be empty"
        );
        assert_eq!(
            signup("9000000000", "1234", "Asha", "short").unwrap_err().to_string(),
            "Password should be atleast 8 chars"
        );
        assert!(signup("9000000000", "1234", "Asha", "longenough").is_ok());
    }

    #[test]
    fn test_object_id_lowercases() {
        assert_eq!(
            object_id("5A1B2C3D4E5F60718293A4B5").unwrap(),
            "5a1b2c3d4e5f60718293a4b5"
        );
        assert!(object_id("5a1b2c3d4e5f60718293a4b").is_err());
        assert!(object_id("zz1b2c3d4e5f60718293a4b5").is_err());
    }

    #[test]
    fn test_int_field_names_field() {
        let err = int_field::<i32>("Quantity", "ten").unwrap_err();
        assert_eq!(err.to_string(), "Quantity is not a valid Integer");
        assert_eq!(int_field::<i64>("SaleStartTime", "-5").unwrap(), -5);
    }
}
