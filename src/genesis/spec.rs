// Spécification du genesis du store de paramètres
use crate::contracts::gov_param::{GovParamContract, GovParamError};
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::info;

/// Spécification du genesis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisSpec {
    /// Propriétaire initial
    pub owner: AccountId,

    /// Contrat de vote désigné dès le genesis (optionnel)
    #[serde(default)]
    pub vote_contract: Option<AccountId>,

    /// Validateurs initiaux (au moins un)
    pub validators: Vec<AccountId>,

    /// Le contrat de vote peut-il modifier l'ensemble des validateurs
    #[serde(default)]
    pub update_vals_votable: bool,

    /// Paramètres initiaux
    #[serde(default)]
    pub params: Vec<GenesisParam>,
}

/// Paramètre dans le genesis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisParam {
    pub id: ParamId,
    pub name: String,
    #[serde(default)]
    pub votable: bool,
    pub value: ParamValue,
}

impl GenesisParam {
    fn new(id: ParamId, name: &str, value: &[u8]) -> Self {
        Self {
            id,
            name: name.to_string(),
            votable: false,
            value: ParamValue::from(value),
        }
    }
}

/// Standard network parameters with their launch values
pub fn default_params() -> Vec<GenesisParam> {
    vec![
        GenesisParam::new(0, "governance.governancemode", b"single"),
        GenesisParam::new(1, "governance.governingnode", &[
            0x52, 0xd4, 0x1c, 0xa7, 0x2a, 0xf6, 0x15, 0xa1, 0xac, 0x33,
            0x01, 0xb0, 0xa9, 0x3e, 0xfa, 0x22, 0x2e, 0xcc, 0x75, 0x41,
        ]),
        // 604800
        GenesisParam::new(2, "istanbul.epoch", &[0x09, 0x3a, 0x80]),
        GenesisParam::new(3, "istanbul.policy", &[0x00]),
        GenesisParam::new(4, "istanbul.committeesize", &[0x01]),
        // 25 ston
        GenesisParam::new(5, "governance.unitprice", &[0x05, 0xd2, 0x1d, 0xba, 0x00]),
        GenesisParam::new(6, "reward.mintingamount", b"9000000000000000000"),
        GenesisParam::new(7, "reward.ratio", b"34/54/12"),
        GenesisParam::new(8, "reward.useginicoeff", &[0x01]),
        GenesisParam::new(9, "reward.deferredtxfee", &[0x01]),
        GenesisParam::new(10, "reward.minimumstake", b"5000000"),
        // 86400
        GenesisParam::new(11, "reward.stakingupdateinterval", &[0x01, 0x51, 0x80]),
        // 3600
        GenesisParam::new(12, "reward.proposerupdateinterval", &[0x0e, 0x10]),
    ]
}

impl GenesisSpec {
    /// Genesis with a single owner who is also the only validator, and the
    /// standard parameter table
    pub fn with_owner(owner: AccountId) -> Self {
        Self {
            owner,
            vote_contract: None,
            validators: vec![owner],
            update_vals_votable: false,
            params: default_params(),
        }
    }

    /// Genesis without any parameter
    pub fn empty(owner: AccountId, validators: Vec<AccountId>) -> Self {
        Self {
            owner,
            vote_contract: None,
            validators,
            update_vals_votable: false,
            params: Vec::new(),
        }
    }

    /// Structural checks that do not need a contract instance
    pub fn validate(&self) -> Result<(), GenesisError> {
        if self.owner.is_zero() {
            return Err(GenesisError::InvalidSpec("owner is the zero account".to_string()));
        }
        if self.validators.is_empty() {
            return Err(GenesisError::InvalidSpec("at least one validator required".to_string()));
        }

        let mut ids = BTreeSet::new();
        for param in &self.params {
            if !ids.insert(param.id) {
                return Err(GenesisError::InvalidSpec(format!("duplicate parameter id {}", param.id)));
            }
        }
        Ok(())
    }

    /// Charge depuis un fichier JSON
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, GenesisError> {
        let content = std::fs::read_to_string(path).map_err(|e| GenesisError::Io(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| GenesisError::InvalidJson(e.to_string()))
    }

    /// Sauvegarde vers un fichier JSON
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), GenesisError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| GenesisError::InvalidJson(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| GenesisError::Io(e.to_string()))
    }
}

/// Builder pour le store genesis
pub struct GenesisBuilder {
    spec: GenesisSpec,
}

impl GenesisBuilder {
    pub fn new(spec: GenesisSpec) -> Self {
        Self { spec }
    }

    /// Construit le store initial, en appliquant chaque entrée comme le propriétaire
    pub fn build(self) -> Result<GovParamContract, GenesisError> {
        self.spec.validate()?;
        let spec = self.spec;
        let owner = spec.owner;

        let mut store = GovParamContract::new(owner, spec.validators)?;

        for param in spec.params {
            store.add_param(&owner, param.id, param.name, param.votable, param.value)?;
        }
        if let Some(vote_contract) = spec.vote_contract {
            store.set_vote_contract(&owner, vote_contract)?;
        }
        if spec.update_vals_votable {
            store.set_update_vals_votable(&owner, true)?;
        }

        info!(
            "Genesis store built: owner {}, {} validators, {} parameters",
            owner,
            store.get_validators().len(),
            store.param_count()
        );

        Ok(store)
    }
}

/// Erreurs de genesis
#[derive(Debug, thiserror::Error)]
pub enum GenesisError {
    #[error("Genesis invalide: {0}")]
    InvalidSpec(String),

    #[error("Fichier genesis illisible: {0}")]
    Io(String),

    #[error("JSON genesis invalide: {0}")]
    InvalidJson(String),

    #[error(transparent)]
    Store(#[from] GovParamError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn owner() -> AccountId {
        AccountId::from_bytes([1; 32])
    }

    #[test]
    fn test_default_params_table() {
        let params = default_params();
        assert_eq!(params.len(), 13);
        for (expected_id, param) in params.iter().enumerate() {
            assert_eq!(param.id as usize, expected_id);
            assert!(!param.votable);
            assert!(!param.name.is_empty());
        }
        assert_eq!(params[5].value.to_hex(), "0x05d21dba00");
        assert_eq!(params[0].value.to_hex(), "0x73696e676c65");
        assert_eq!(params[7].value.to_hex(), "0x33342f35342f3132");
    }

    #[test]
    fn test_build_with_owner() {
        let mut store = GenesisBuilder::new(GenesisSpec::with_owner(owner())).build().unwrap();

        assert_eq!(store.owner(), owner());
        assert_eq!(store.get_validators(), &[owner()]);

        let all = store.get_all_params(0);
        assert_eq!(all.len(), 13);
        assert_eq!(all[2].0, "istanbul.epoch");
        assert_eq!(all[2].1.to_hex(), "0x093a80");
    }

    #[test]
    fn test_build_applies_flags() {
        let voter = AccountId::from_bytes([2; 32]);
        let mut spec = GenesisSpec::empty(owner(), vec![owner()]);
        spec.vote_contract = Some(voter);
        spec.update_vals_votable = true;

        let store = GenesisBuilder::new(spec).build().unwrap();
        assert_eq!(store.vote_contract(), Some(voter));
        assert!(store.update_vals_votable());
    }

    #[test]
    fn test_validate_rejects_bad_specs() {
        let spec = GenesisSpec::empty(owner(), vec![]);
        assert!(matches!(spec.validate(), Err(GenesisError::InvalidSpec(_))));

        let spec = GenesisSpec::empty(AccountId::ZERO, vec![owner()]);
        assert!(matches!(spec.validate(), Err(GenesisError::InvalidSpec(_))));

        let mut spec = GenesisSpec::with_owner(owner());
        spec.params.push(GenesisParam::new(5, "duplicate", &[0x00]));
        assert!(matches!(spec.validate(), Err(GenesisError::InvalidSpec(_))));
    }

    #[test]
    fn test_build_rejects_empty_name() {
        let mut spec = GenesisSpec::empty(owner(), vec![owner()]);
        spec.params.push(GenesisParam::new(1, "", &[0x00]));

        assert!(matches!(
            GenesisBuilder::new(spec).build(),
            Err(GenesisError::Store(GovParamError::Param(_)))
        ));
    }

    #[test]
    fn test_file_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("genesis.json");
        let path = path.to_str().unwrap();

        let spec = GenesisSpec::with_owner(owner());
        spec.to_file(path).unwrap();

        let loaded = GenesisSpec::from_file(path).unwrap();
        assert_eq!(loaded, spec);

        let raw = std::fs::read_to_string(path).unwrap();
        assert!(raw.contains("\"0x05d21dba00\""));
    }

    #[test]
    fn test_minimal_json() {
        let json = format!(
            r#"{{ "owner": "{}", "validators": ["{}"] }}"#,
            owner().to_hex(),
            owner().to_hex()
        );
        let spec: GenesisSpec = serde_json::from_str(&json).unwrap();
        assert!(spec.params.is_empty());
        assert!(spec.vote_contract.is_none());
        assert!(!spec.update_vals_votable);
    }
}
