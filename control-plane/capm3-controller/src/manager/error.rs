#[derive(thiserror::Error, Debug)]
pub enum TemplateError {
    #[error("invalid metal3MachineTemplate: {0}")]
    InvalidTemplate(String),

    #[error("failed to list metal3Machines in {namespace}: {source}")]
    List {
        namespace: String,
        #[source]
        source: kube::Error,
    },

    #[error("failed to update metal3Machine {namespace}/{name}: {source}")]
    Update {
        namespace: String,
        name: String,
        #[source]
        source: kube::Error,
    },

    #[error("synchronization cancelled")]
    Cancelled,
}
