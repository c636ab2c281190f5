use capm3_controller::crd::{Metal3MachineTemplate, metal3_machine_crd};
use kube::core::CustomResourceExt;

fn main() -> anyhow::Result<()> {
    for crd in [metal3_machine_crd(), Metal3MachineTemplate::crd()] {
        println!("---");
        println!("{}", serde_yaml::to_string(&crd)?);
    }
    Ok(())
}
