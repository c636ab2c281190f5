use envconfig::Envconfig;

#[derive(Envconfig, Clone, Debug)]
pub struct ControllerConfig {
    /// Namespace to watch for Metal3MachineTemplates; unset or empty watches all.
    /// Env: CAPM3_WATCH_NAMESPACE
    #[envconfig(from = "CAPM3_WATCH_NAMESPACE")]
    pub watch_namespace: Option<String>,

    /// Delay before a failed reconcile is retried.
    /// Env: CAPM3_REQUEUE_ON_ERROR_SECS
    #[envconfig(from = "CAPM3_REQUEUE_ON_ERROR_SECS", default = "30")]
    pub requeue_on_error_secs: u64,

    /// Skip the update call for machines that already carry the template value.
    /// Env: CAPM3_SKIP_UNCHANGED
    #[envconfig(from = "CAPM3_SKIP_UNCHANGED", default = "false")]
    pub skip_unchanged: bool,

    #[envconfig(from = "HTTP_PORT", default = "8088")]
    pub http_port: u16,
}

impl ControllerConfig {
    pub fn watch_scope(&self) -> Option<&str> {
        self.watch_namespace
            .as_deref()
            .map(str::trim)
            .filter(|ns| !ns.is_empty())
    }
}
