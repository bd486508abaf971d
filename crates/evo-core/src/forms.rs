//! Validated input forms for the mutating dialogs.

use validator::{Validate, ValidationErrors};

/// Login dialog.
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct LoginForm {
    #[validate(email(message = "Email inválido"))]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter pelo menos 6 caracteres"))]
    pub password: String,
}

/// Client create/edit dialog.
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct ClienteForm {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub nome: String,
    #[validate(length(min = 1, message = "O token é obrigatório."))]
    pub token: String,
    pub automotivo: bool,
}

/// Sync account dialog (master or slave).
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct AccountForm {
    #[validate(length(min = 1, message = "O subdomínio é obrigatório."))]
    pub subdomain: String,
    #[validate(length(min = 1, message = "O refresh token é obrigatório."))]
    pub refresh_token: String,
    pub is_master: bool,
}

/// Account group create/edit dialog.
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct GroupForm {
    #[validate(length(min = 1, message = "O nome do grupo é obrigatório."))]
    pub name: String,
    pub description: String,
    #[validate(range(min = 1, message = "Selecione a conta master."))]
    pub master_account_id: i64,
}

/// First validation message, ordered by field name so the result is stable.
pub fn first_error(errors: &ValidationErrors) -> String {
    let mut messages: Vec<(String, String)> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Campo inválido: {field}"));
                (field.to_string(), message)
            })
        })
        .collect();
    messages.sort();
    messages
        .into_iter()
        .next()
        .map(|(_, message)| message)
        .unwrap_or_else(|| "Formulário inválido.".to_string())
}

/// Validate and flatten the outcome to a displayable message.
pub fn check<T: Validate>(form: &T) -> Result<(), String> {
    form.validate().map_err(|e| first_error(&e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_requires_email_and_password_length() {
        let form = LoginForm {
            email: "not-an-email".into(),
            password: "123456".into(),
        };
        assert_eq!(check(&form), Err("Email inválido".to_string()));

        let form = LoginForm {
            email: "ana@evo.com".into(),
            password: "123".into(),
        };
        assert_eq!(
            check(&form),
            Err("A senha deve ter pelo menos 6 caracteres".to_string())
        );

        let form = LoginForm {
            email: "ana@evo.com".into(),
            password: "123456".into(),
        };
        assert!(check(&form).is_ok());
    }

    #[test]
    fn group_requires_master() {
        let form = GroupForm {
            name: "Rede Sul".into(),
            description: String::new(),
            master_account_id: 0,
        };
        assert_eq!(check(&form), Err("Selecione a conta master.".to_string()));
    }

    #[test]
    fn cliente_reports_first_field_alphabetically() {
        let form = ClienteForm::default();
        assert_eq!(check(&form), Err("O nome é obrigatório.".to_string()));
    }
}
