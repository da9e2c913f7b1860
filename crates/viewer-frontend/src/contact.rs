//! Contact panel
//!
//! The caller that owns the viewer's visibility flag: submitting the form
//! reveals the model viewer.

/// A submitted message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// Contact form state
#[derive(Debug, Default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactForm {
    /// True when every field is filled in and the email looks like one
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty()
            && self.email.trim().contains('@')
            && !self.message.trim().is_empty()
    }

    /// Take the message out of the form, clearing its fields.
    pub fn submit(&mut self) -> Option<ContactMessage> {
        if !self.is_complete() {
            return None;
        }
        let submitted = ContactMessage {
            name: std::mem::take(&mut self.name),
            email: std::mem::take(&mut self.email),
            message: std::mem::take(&mut self.message),
        };
        tracing::info!("Contact message from {} <{}>", submitted.name, submitted.email);
        Some(submitted)
    }

    /// Draw the form. Returns the message when it was submitted this frame.
    pub fn ui(&mut self, ui: &mut egui::Ui) -> Option<ContactMessage> {
        ui.heading("Contact me");
        ui.add_space(8.0);

        ui.add(egui::TextEdit::singleline(&mut self.name).hint_text("Name:"));
        ui.add(egui::TextEdit::singleline(&mut self.email).hint_text("Email:"));
        ui.add(
            egui::TextEdit::multiline(&mut self.message)
                .hint_text("Message:")
                .desired_rows(4),
        );

        ui.add_space(8.0);
        let send = ui.add_enabled(self.is_complete(), egui::Button::new("Send"));
        if send.clicked() { self.submit() } else { None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> ContactForm {
        ContactForm {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            message: "Hello".to_string(),
        }
    }

    #[test]
    fn test_submit_clears_fields() {
        let mut form = filled();
        let message = form.submit().unwrap();
        assert_eq!(message.name, "Ada");
        assert_eq!(message.email, "ada@example.com");
        assert!(form.name.is_empty());
        assert!(form.email.is_empty());
        assert!(form.message.is_empty());
    }

    #[test]
    fn test_incomplete_form_is_not_submitted() {
        let mut form = filled();
        form.email = "not-an-email".to_string();
        assert!(form.submit().is_none());
        assert_eq!(form.name, "Ada");

        let mut form = filled();
        form.message = "   ".to_string();
        assert!(!form.is_complete());
    }
}
