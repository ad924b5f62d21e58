//! Command sets shared by several services.

pub use crate::domain::config::{decode_base64, resolve_home_dir};

/// Default Node.js major version for React apps.
pub const DEFAULT_NODE_VERSION: &str = "18";
/// Jetty release installed for WAR services.
pub const JETTY_VERSION: &str = "11.0.15";

/// Refresh packages and install `software-properties-common`.
#[must_use]
pub fn updating_ubuntu() -> Vec<String> {
    vec![
        "sudo apt update && sudo apt upgrade -y".to_string(),
        "sudo apt install software-properties-common -y".to_string(),
    ]
}

/// Install Docker through the convenience script.
#[must_use]
pub fn installing_docker() -> Vec<String> {
    vec![
        "curl -fsSL https://get.docker.com -o get-docker.sh".to_string(),
        "sh get-docker.sh".to_string(),
    ]
}

/// Install Docker and let the login user run it without `sudo`.
#[must_use]
pub fn installing_sudo_less_docker() -> Vec<String> {
    let mut commands = updating_ubuntu();
    commands.extend(installing_docker());
    commands.extend([
        "getent group docker || sudo groupadd docker".to_string(),
        "sudo usermod -aG docker $USER".to_string(),
        "sudo chmod 666 /var/run/docker.sock".to_string(),
    ]);
    commands
}

/// Install Node.js `version` plus yarn and serve.
#[must_use]
pub fn installing_node(version: &str) -> Vec<String> {
    vec![
        "sudo apt install -y curl".to_string(),
        format!("curl -fsSL https://deb.nodesource.com/setup_{version}.x | sudo -E bash -"),
        "sudo apt install -y nodejs".to_string(),
        "sudo npm install -g yarn".to_string(),
        "sudo npm install -g serve".to_string(),
    ]
}

/// Install OpenJDK 17 and export `JAVA_HOME` for the rest of the script.
#[must_use]
pub fn installing_jdk17() -> Vec<String> {
    vec![
        "sudo apt update -y".to_string(),
        "sudo apt install openjdk-17-jdk -y".to_string(),
        "export JAVA_HOME=/usr/lib/jvm/java-17-openjdk-amd64".to_string(),
    ]
}

/// Unpack Jetty under `home_dir`, create a base and deploy `ROOT.war` into it.
///
/// Relies on `cd` and exported variables persisting between lines.
#[must_use]
pub fn installing_jetty(home_dir: &str) -> Vec<String> {
    vec![
        format!("export JETTY_VERSION={JETTY_VERSION}"),
        "wget https://repo1.maven.org/maven2/org/eclipse/jetty/jetty-home/$JETTY_VERSION/jetty-home-$JETTY_VERSION.tar.gz".to_string(),
        "tar -xzvf jetty-home-$JETTY_VERSION.tar.gz".to_string(),
        "rm jetty-home-$JETTY_VERSION.tar.gz".to_string(),
        format!("export JETTY_HOME={home_dir}/jetty-home-$JETTY_VERSION"),
        "mkdir jetty-base".to_string(),
        "cd jetty-base".to_string(),
        "java -jar $JETTY_HOME/start.jar --add-module=annotations,server,http,deploy,servlet,webapp,resources,jsp".to_string(),
        format!("mv {home_dir}/ROOT.war webapps/ROOT.war"),
        "cd ../".to_string(),
    ]
}

/// Join `home_dir` and a file name with exactly one `/`.
#[must_use]
pub fn home_path(home_dir: &str, name: &str) -> String {
    format!("{}/{name}", home_dir.trim_end_matches('/'))
}
