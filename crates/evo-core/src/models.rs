//! Records exchanged with the clientes and sync backends.
//!
//! These are plain data carriers: the backend owns every invariant, so fields
//! the backend may omit are defaulted rather than rejected.

use serde::{Deserialize, Deserializer, Serialize};

/// Accepts `12`, `"12"` or `null` (as 0) for numeric ids.
fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
        Text(String),
        Null(()),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Int(n) => Ok(n),
        Raw::Float(f) => Ok(f as i64),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
        Raw::Null(()) => Ok(0),
    }
}

/// Accepts strings or numbers and keeps the textual form.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
        Null(()),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Float(f) => f.to_string(),
        Raw::Null(()) => String::new(),
    })
}

// ---------------------------------------------------------------------------
// Clientes backend
// ---------------------------------------------------------------------------

/// A client account. `token` is an opaque CRM credential passed through as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cliente {
    #[serde(deserialize_with = "lenient_i64")]
    pub id: i64,
    pub nome: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub automotivo: bool,
}

/// Body for client creation and update.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewCliente {
    pub nome: String,
    pub token: String,
    pub automotivo: bool,
}

/// One status (stage) of a CRM pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineStatus {
    #[serde(deserialize_with = "lenient_i64")]
    pub id: i64,
    pub nome: String,
    #[serde(default)]
    pub is_editable: bool,
    #[serde(rename = "type", default)]
    pub kind: i64,
}

/// A CRM pipeline as reported for a client, with its statuses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    #[serde(deserialize_with = "lenient_i64")]
    pub id: i64,
    pub nome: String,
    #[serde(default)]
    pub status: Vec<PipelineStatus>,
}

/// Association between a client and one of its CRM pipelines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientePipeline {
    #[serde(deserialize_with = "lenient_i64")]
    pub id: i64,
    #[serde(default)]
    pub nome: String,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub cliente_id: i64,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub pipeline_id: i64,
    #[serde(default)]
    pub subdomain: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewClientePipeline {
    pub cliente_id: i64,
    pub pipeline_id: i64,
    pub nome: String,
}

/// A CRM unit ("unidade") a TinTim integration can be scoped to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Unidade {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default)]
    pub value: String,
}

/// A TinTim webhook integration unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TintimRecord {
    #[serde(deserialize_with = "lenient_i64")]
    pub id: i64,
    #[serde(default)]
    pub cliente: String,
    #[serde(default)]
    pub unidade: String,
    #[serde(default)]
    pub todas_unidades: bool,
    #[serde(default)]
    pub unidade_formatada: String,
    #[serde(default, alias = "data_ultimo_lead", alias = "ultima_atividade")]
    pub data_ultima_atividade: Option<String>,
}

impl TintimRecord {
    /// Unit label as listed: "Todas" for integrations spanning every unit.
    pub fn unidade_label(&self) -> String {
        if self.todas_unidades {
            "Todas".to_string()
        } else {
            self.unidade_formatada.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTintim {
    pub empresa_id: i64,
    pub nome: String,
    pub todas_unidades: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TintimUpdate {
    pub nome: String,
    pub todas_unidades: bool,
}

/// A Portais binding between a client and a CRM funnel/status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Portal {
    #[serde(deserialize_with = "lenient_i64")]
    pub id: i64,
    #[serde(default)]
    pub nome: String,
    #[serde(default)]
    pub pipeline: String,
    #[serde(default)]
    pub status_pipeline: String,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub pipeline_id: i64,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub status_id: i64,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub id_cliente: i64,
    #[serde(default)]
    pub data_ultimo_lead: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPortal {
    pub cliente_id: i64,
    pub pipeline_id: i64,
    pub status_id: i64,
    pub nome: String,
    #[serde(rename = "type")]
    pub kind: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortalUpdate {
    pub pipeline_id: i64,
    pub status_id: i64,
    #[serde(rename = "type")]
    pub kind: i64,
}

/// A lead delivered through a TinTim integration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TintimLead {
    pub id: Option<i64>,
    pub nome_empresa: Option<String>,
    pub nome_lead: Option<String>,
    pub telefone: Option<String>,
    pub nome_anuncio: Option<String>,
    pub nome_campanha: Option<String>,
    pub nome_conjunto: Option<String>,
    pub source: Option<String>,
    pub midia: Option<String>,
    pub data_criacao: Option<String>,
    pub integrado: bool,
    pub causa: Option<String>,
}

/// A lead delivered through a Portais binding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalLead {
    pub id: Option<i64>,
    pub nome: Option<String>,
    pub nome_lead: Option<String>,
    pub telefone: Option<String>,
    pub midia: Option<String>,
    pub origem: Option<String>,
    pub veiculo: Option<String>,
    pub valor: Option<f64>,
    pub data_criada: Option<String>,
    pub integrado: bool,
    pub causa: Option<String>,
}

/// Acknowledgement of a mutating call (`{ success, message }`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Ack {
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// Sync backend
// ---------------------------------------------------------------------------

/// A CRM account known to the sync service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Account {
    #[serde(deserialize_with = "lenient_i64")]
    pub id: i64,
    pub subdomain: String,
    #[serde(default)]
    pub is_master: bool,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Body for account creation. `group_id` attaches a slave to a group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewAccount {
    pub subdomain: String,
    pub refresh_token: String,
    pub is_master: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MasterAccount {
    #[serde(deserialize_with = "lenient_i64")]
    pub id: i64,
    pub subdomain: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlaveAccount {
    #[serde(deserialize_with = "lenient_i64")]
    pub id: i64,
    pub subdomain: String,
    #[serde(default)]
    pub contact_count: Option<i64>,
    #[serde(default)]
    pub last_sync: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LastSync {
    pub started_at: Option<String>,
    pub completed_at: Option<String>,
    pub status: Option<String>,
}

/// A master account replicated into its slave accounts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountGroup {
    #[serde(deserialize_with = "lenient_i64")]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub master_account: Option<MasterAccount>,
    #[serde(default)]
    pub slave_count: i64,
    #[serde(default)]
    pub last_sync: Option<LastSync>,
    #[serde(default)]
    pub slave_accounts: Vec<SlaveAccount>,
    #[serde(default)]
    pub total_contacts: Option<i64>,
}

/// Body for group creation and update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupPayload {
    pub name: String,
    pub description: String,
    pub master_account_id: i64,
}

/// Scope of a group-level synchronization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncType {
    Full,
    Pipelines,
    CustomFields,
    FieldGroups,
    RequiredStatuses,
    Roles,
}

impl SyncType {
    pub const ALL: [SyncType; 6] = [
        SyncType::Full,
        SyncType::Pipelines,
        SyncType::CustomFields,
        SyncType::FieldGroups,
        SyncType::RequiredStatuses,
        SyncType::Roles,
    ];

    /// Wire name sent as `sync_type`.
    pub fn as_str(self) -> &'static str {
        match self {
            SyncType::Full => "full",
            SyncType::Pipelines => "pipelines",
            SyncType::CustomFields => "custom_fields",
            SyncType::FieldGroups => "field_groups",
            SyncType::RequiredStatuses => "required_statuses",
            SyncType::Roles => "roles",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SyncType::Full => "Sincronização completa",
            SyncType::Pipelines => "Pipelines",
            SyncType::CustomFields => "Campos personalizados",
            SyncType::FieldGroups => "Grupos de campos",
            SyncType::RequiredStatuses => "Status obrigatórios",
            SyncType::Roles => "Funções",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cliente_accepts_string_id_and_missing_flag() {
        let c: Cliente = serde_json::from_value(json!({"id": "7", "nome": "Loja", "token": "t"})).unwrap();
        assert_eq!(c.id, 7);
        assert!(!c.automotivo);
    }

    #[test]
    fn unidade_id_keeps_numeric_text() {
        let u: Unidade = serde_json::from_value(json!({"id": 42, "value": "Centro"})).unwrap();
        assert_eq!(u.id, "42");
    }

    #[test]
    fn status_type_field_is_renamed() {
        let s: PipelineStatus =
            serde_json::from_value(json!({"id": 1, "nome": "Novo", "type": 2})).unwrap();
        assert_eq!(s.kind, 2);
        let body = serde_json::to_value(PortalUpdate { pipeline_id: 1, status_id: 2, kind: 3 }).unwrap();
        assert_eq!(body["type"], 3);
    }

    #[test]
    fn slave_account_body_carries_group() {
        let body = serde_json::to_value(NewAccount {
            subdomain: "loja".into(),
            refresh_token: "r".into(),
            is_master: false,
            group_id: Some(3),
        })
        .unwrap();
        assert_eq!(body["group_id"], 3);
        let master = serde_json::to_value(NewAccount {
            subdomain: "m".into(),
            refresh_token: "r".into(),
            is_master: true,
            group_id: None,
        })
        .unwrap();
        assert!(master.get("group_id").is_none());
    }

    #[test]
    fn sync_type_wire_names() {
        assert_eq!(serde_json::to_value(SyncType::CustomFields).unwrap(), "custom_fields");
        assert_eq!(SyncType::RequiredStatuses.as_str(), "required_statuses");
    }

    #[test]
    fn tintim_label_for_all_units() {
        let t = TintimRecord {
            todas_unidades: true,
            unidade_formatada: "centro".into(),
            ..Default::default()
        };
        assert_eq!(t.unidade_label(), "Todas");
    }
}
