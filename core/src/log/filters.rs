use super::LogError;
use log::LevelFilter;
use log4rs::config::Logger;
use std::env;

/// Per-module level filters parsed from an expression such as `info,kgi_processing=trace`.
/// A bare level sets the root level. Later specs override earlier ones.
#[derive(Debug, Default)]
pub(super) struct Filters {
    root_level: Option<LevelFilter>,
    modules: Vec<(String, LevelFilter)>,
}

impl Filters {
    pub fn root_level(&mut self, level: LevelFilter) -> &mut Self {
        self.root_level = Some(level);
        self
    }

    pub fn parse_env(&mut self, env: &str) -> Result<&mut Self, LogError> {
        self.parse_expression(&env::var(env).unwrap_or_default())
    }

    pub fn parse_expression(&mut self, expression: &str) -> Result<&mut Self, LogError> {
        for spec in expression.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            match spec.split_once('=') {
                None => match spec.parse::<LevelFilter>() {
                    Ok(level) => self.root_level = Some(level),
                    // A bare module name enables everything for that module
                    Err(_) => self.set_module(spec, LevelFilter::max()),
                },
                Some((module, level)) => {
                    let module = module.trim();
                    if module.is_empty() {
                        return Err(LogError::ParseLoggerSpec(spec.to_string()));
                    }
                    let level = level.trim().parse::<LevelFilter>().map_err(|_| LogError::ParseLoggerSpec(spec.to_string()))?;
                    self.set_module(module, level);
                }
            }
        }
        Ok(self)
    }

    fn set_module(&mut self, module: &str, level: LevelFilter) {
        self.modules.retain(|(name, _)| name != module);
        self.modules.push((module.to_string(), level));
    }

    pub fn root(&self) -> LevelFilter {
        self.root_level.unwrap_or(LevelFilter::Error)
    }

    pub fn loggers(&self) -> impl Iterator<Item = Logger> + '_ {
        self.modules.iter().map(|(name, level)| Logger::builder().build(name.clone(), *level))
    }

    #[cfg(test)]
    pub fn module_level(&self, module: &str) -> Option<LevelFilter> {
        self.modules.iter().find(|(name, _)| name == module).map(|(_, level)| *level)
    }
}
