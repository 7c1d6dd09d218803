use crate::error::NotifyError;
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use url::{form_urlencoded, Url};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static email pattern"));

/// Where plan requests are sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifySettings {
    pub endpoint_base: String,
    pub recipient: String,
}

impl Default for NotifySettings {
    fn default() -> Self {
        Self {
            endpoint_base: "https://wa.me".to_string(),
            recipient: "91XXXXXXXXXX".to_string(),
        }
    }
}

/// Details entered in the plan request form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanRequest {
    pub name: String,
    pub email: String,
    pub hours_per_day: String,
    pub exam_date: String,
}

impl PlanRequest {
    pub fn validate(&self) -> Result<(), NotifyError> {
        if self.name.trim().is_empty() {
            return Err(NotifyError::MissingName);
        }
        if !EMAIL_RE.is_match(self.email.trim()) {
            return Err(NotifyError::InvalidEmail(self.email.clone()));
        }
        match self.hours_per_day.trim().parse::<f32>() {
            Ok(hours) if (1.0..=24.0).contains(&hours) => {}
            _ => return Err(NotifyError::InvalidHours(self.hours_per_day.clone())),
        }
        if NaiveDate::parse_from_str(self.exam_date.trim(), "%Y-%m-%d").is_err() {
            return Err(NotifyError::InvalidDate(self.exam_date.clone()));
        }
        Ok(())
    }
}

pub fn compose_message(request: &PlanRequest, overall: &str) -> String {
    format!(
        "
*Personalised Study Plan Request*
------------------------------------
Name: {}
Email: {}
Hours/Day: {}
Exam Date: {}

Overall Completion: {}

Please send personalised study plan.
",
        request.name.trim(),
        request.email.trim(),
        request.hours_per_day.trim(),
        request.exam_date.trim(),
        overall
    )
}

/// `<base>/<recipient>?text=<message>` with the message percent-encoded.
pub fn deep_link(endpoint_base: &str, recipient: &str, message: &str) -> Result<Url, NotifyError> {
    let mut url = Url::parse(endpoint_base)?;
    url.path_segments_mut()
        .map_err(|_| NotifyError::EndpointBase(endpoint_base.to_string()))?
        .pop_if_empty()
        .push(recipient);

    // form encoding turns spaces into '+'; literal '+' is already %2B
    let text: String = form_urlencoded::byte_serialize(message.as_bytes())
        .collect::<String>()
        .replace('+', "%20");
    url.set_query(Some(&format!("text={text}")));
    Ok(url)
}

/// Validate, compose and hand the link to the system opener.
pub fn send_plan_request(
    settings: &NotifySettings,
    request: &PlanRequest,
    overall: &str,
) -> Result<Url, NotifyError> {
    request.validate()?;
    let message = compose_message(request, overall);
    let url = deep_link(&settings.endpoint_base, &settings.recipient, &message)?;
    open::that(url.as_str())?;
    tracing::info!(recipient = %settings.recipient, "Opened plan request link");
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn request() -> PlanRequest {
        PlanRequest {
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            hours_per_day: "6".to_string(),
            exam_date: "2027-03-01".to_string(),
        }
    }

    #[test]
    fn message_layout() {
        let msg = compose_message(&request(), "33%");
        assert_eq!(
            msg,
            "\n*Personalised Study Plan Request*\n\
             ------------------------------------\n\
             Name: Asha\n\
             Email: asha@example.com\n\
             Hours/Day: 6\n\
             Exam Date: 2027-03-01\n\
             \n\
             Overall Completion: 33%\n\
             \n\
             Please send personalised study plan.\n"
        );
    }

    #[test]
    fn deep_link_encodes_message() {
        let url = deep_link("https://wa.me", "911234567890", "Hi there\n50% & more+").unwrap();
        assert_eq!(
            url.as_str(),
            "https://wa.me/911234567890?text=Hi%20there%0A50%25%20%26%20more%2B"
        );
    }

    #[test]
    fn deep_link_rejects_bad_base() {
        assert!(matches!(
            deep_link("not a url", "1", "x"),
            Err(NotifyError::Url(_))
        ));
        assert!(matches!(
            deep_link("mailto:someone@example.com", "1", "x"),
            Err(NotifyError::EndpointBase(_))
        ));
    }

    #[test]
    fn validation() {
        assert!(request().validate().is_ok());

        let mut r = request();
        r.name = "  ".to_string();
        assert!(matches!(r.validate(), Err(NotifyError::MissingName)));

        let mut r = request();
        r.email = "asha.example.com".to_string();
        assert!(matches!(r.validate(), Err(NotifyError::InvalidEmail(_))));

        let mut r = request();
        r.hours_per_day = "30".to_string();
        assert!(matches!(r.validate(), Err(NotifyError::InvalidHours(_))));

        let mut r = request();
        r.exam_date = "01/03/2027".to_string();
        assert!(matches!(r.validate(), Err(NotifyError::InvalidDate(_))));
    }
}
