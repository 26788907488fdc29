use crate::config::Config;
use crate::error::{MigrateError, Result};
use crate::steps::Step;
use crate::steps::convert::Convert;
use crate::steps::list::List;

/// Ordered steps for one plugin run.
pub struct Plan {
    steps: Vec<Box<dyn Step>>,
}

impl Plan {
    /// Pick the steps for the configured helm command.
    pub fn new(cfg: &Config) -> Result<Self> {
        let steps: Vec<Box<dyn Step>> = match cfg.helm_command.as_str() {
            "convert" => vec![Box::new(Convert::new(cfg))],
            "list" => vec![Box::new(List::new(cfg))],
            other => return Err(MigrateError::UnknownCommand(other.to_string())),
        };
        Ok(Self { steps })
    }

    pub fn from_steps(steps: Vec<Box<dyn Step>>) -> Self {
        Self { steps }
    }

    pub fn prepare(&mut self) -> Result<()> {
        for step in &mut self.steps {
            step.prepare()?;
        }
        Ok(())
    }

    pub fn execute(&mut self) -> Result<()> {
        for step in &mut self.steps {
            step.execute()?;
        }
        Ok(())
    }
}
