use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::error::{Result, TdqnError};
use crate::network::NeuralNetwork;

/// How target networks follow the online network.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Default)]
pub enum SyncMode {
    /// Exact copy of the online parameters
    #[default]
    Hard,
    /// Polyak averaging: `target * (1 - tau) + online * tau`
    Soft { tau: f64 },
}

/// Number of target networks the learner bootstraps from.
///
/// `Twin` keeps two independently initialised copies, each producing its own set
/// of regression targets. Both follow the online network with the same rule, so
/// they only differ through their initial weights (and not at all after a hard
/// sync). `Single` drops the redundant copy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TargetNetworks {
    Single,
    #[default]
    Twin,
}

impl TargetNetworks {
    pub fn count(&self) -> usize {
        match self {
            TargetNetworks::Single => 1,
            TargetNetworks::Twin => 2,
        }
    }
}

/// The target networks and the rule that refreshes them.
#[derive(Clone, Debug)]
pub struct TargetSet {
    networks: Vec<NeuralNetwork>,
    mode: SyncMode,
}

impl TargetSet {
    pub fn new(networks: Vec<NeuralNetwork>, mode: SyncMode) -> Result<Self> {
        if networks.is_empty() {
            return Err(TdqnError::invalid_parameter("target_networks", "at least one target network is required"));
        }
        if let SyncMode::Soft { tau } = mode {
            if !(0.0..=1.0).contains(&tau) {
                return Err(TdqnError::invalid_parameter("tau".to_string(), format!("{} is outside [0, 1]", tau)));
            }
        }
        Ok(TargetSet { networks, mode })
    }

    pub fn mode(&self) -> SyncMode {
        self.mode
    }

    pub fn networks(&self) -> &[NeuralNetwork] {
        &self.networks
    }

    pub fn len(&self) -> usize {
        self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }

    /// Refresh every target from a snapshot of the online parameters.
    pub fn sync(&mut self, online: &NeuralNetwork) -> Result<()> {
        let snapshot = online.parameters();
        for target in &mut self.networks {
            match self.mode {
                SyncMode::Hard => target.set_parameters(&snapshot)?,
                SyncMode::Soft { tau } => {
                    let mut blended = target.parameters();
                    blended.blend_toward(&snapshot, tau)?;
                    target.set_parameters(&blended)?;
                }
            }
        }
        debug!(mode = ?self.mode, targets = self.networks.len(), "target networks synchronized");
        Ok(())
    }
}
