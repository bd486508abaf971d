//! Editable fields of the login screen, dialogs and filter panels.
//!
//! Every form the console shows is flattened into a list of [`Field`]s so
//! key handling and rendering work the same way for all of them.

/// Text input a field writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextTarget {
    LoginEmail,
    LoginPassword,
    ClienteNome,
    ClienteToken,
    AccountSubdomain,
    AccountRefreshToken,
    GroupName,
    GroupDescription,
    /// Filter field, by name.
    Filter(String),
}

/// Option list a field is chosen from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickTarget {
    /// Route palette.
    Route,
    /// Select-type filter field, by name.
    FilterSelect(String),
    TintimCliente,
    TintimUnidade,
    PortalCliente,
    PortalPipeline,
    PortalStatus,
    PipelineAdd,
    GroupMaster,
    AssociateAccount,
    SyncGroup,
}

/// Boolean flipped in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleTarget {
    ClienteAutomotivo,
    AccountMaster,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldAction {
    Text(TextTarget),
    Pick(PickTarget),
    Toggle(ToggleTarget),
    /// Radio filter field cycled through its options, by name.
    Cycle(String),
    /// Read-only line.
    Static,
    /// Submit button; `false` when the form has nothing to send yet.
    Submit(bool),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub label: String,
    pub value: String,
    pub action: FieldAction,
    /// Render the value as bullets.
    pub masked: bool,
}

impl Field {
    pub fn text(label: &str, value: impl Into<String>, target: TextTarget) -> Self {
        Self {
            label: label.to_string(),
            value: value.into(),
            action: FieldAction::Text(target),
            masked: false,
        }
    }

    pub fn secret(label: &str, value: impl Into<String>, target: TextTarget) -> Self {
        Self {
            masked: true,
            ..Self::text(label, value, target)
        }
    }

    pub fn pick(label: &str, value: impl Into<String>, target: PickTarget) -> Self {
        Self {
            label: label.to_string(),
            value: value.into(),
            action: FieldAction::Pick(target),
            masked: false,
        }
    }

    pub fn toggle(label: &str, on: bool, target: ToggleTarget) -> Self {
        Self {
            label: label.to_string(),
            value: if on { "Sim" } else { "Não" }.to_string(),
            action: FieldAction::Toggle(target),
            masked: false,
        }
    }

    pub fn fixed(label: &str, value: impl Into<String>) -> Self {
        Self {
            label: label.to_string(),
            value: value.into(),
            action: FieldAction::Static,
            masked: false,
        }
    }

    pub fn submit(label: &str, enabled: bool) -> Self {
        Self {
            label: label.to_string(),
            value: String::new(),
            action: FieldAction::Submit(enabled),
            masked: false,
        }
    }

    /// Whether the cursor may stop on this field.
    pub fn is_interactive(&self) -> bool {
        !matches!(self.action, FieldAction::Static)
    }

    /// Value as drawn on screen.
    pub fn display(&self) -> String {
        if self.masked {
            "•".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secrets_are_masked_per_char() {
        let field = Field::secret("Senha", "abc123", TextTarget::LoginPassword);
        assert_eq!(field.display(), "••••••");
        assert_eq!(field.value, "abc123");
    }

    #[test]
    fn static_fields_are_skipped() {
        assert!(!Field::fixed("Grupo", "Rede").is_interactive());
        assert!(Field::submit("Salvar", false).is_interactive());
        assert_eq!(
            Field::toggle("Automotivo", true, ToggleTarget::ClienteAutomotivo).value,
            "Sim"
        );
    }
}
