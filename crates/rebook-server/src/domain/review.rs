//! Rating branch rules and the share/referral artifact.
//!
//! A rating of 4 or 5 routes the customer to the public review destination;
//! anything lower is captured privately. The threshold is the
//! retention-protecting filter, so it lives here rather than in a handler.

/// Lowest rating that routes to the public review destination.
pub const PUBLIC_RATING_THRESHOLD: i32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewBranch {
    /// Send the customer to the public destination; nothing is persisted.
    Redirect,
    /// Capture free-text feedback as a Visit, away from public channels.
    Feedback,
}

/// Returns the branch for a rating, or `None` when out of the 1-5 range.
pub fn branch_for_rating(rating: i32) -> Option<ReviewBranch> {
    match rating {
        r if (PUBLIC_RATING_THRESHOLD..=5).contains(&r) => Some(ReviewBranch::Redirect),
        r if (1..PUBLIC_RATING_THRESHOLD).contains(&r) => Some(ReviewBranch::Feedback),
        _ => None,
    }
}

/// Deterministic referral slug: the digits of the customer's phone number.
pub fn referral_slug(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}

pub fn referral_link(app_url: &str, phone: &str) -> String {
    format!(
        "{}/ref/{}",
        app_url.trim_end_matches('/'),
        referral_slug(phone)
    )
}

pub fn share_message(business_name: &str, referral_link: &str) -> String {
    format!(
        "Hey! I just visited {business_name} and loved it. \
         Use my link to get 10% off your first visit: {referral_link}"
    )
}

/// Pre-filled WhatsApp share URL for the referral message.
pub fn whatsapp_share_url(text: &str) -> String {
    format!("https://wa.me/?text={}", urlencoding::encode(text))
}
