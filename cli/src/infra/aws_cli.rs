//! Infrastructure implementation of the cloud port traits.
//!
//! `AwsCliContext<R>` drives the `aws ec2` command-line client through a
//! `CommandRunner`, one process per call, and decodes its JSON output.
//! Failures are recognized from the client's
//! `An error occurred (<Code>) when calling the <Op> operation: <message>`
//! line on stderr.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::application::ports::{
    CommandRunner, InstanceInspector, InstanceLifecycle, SnapshotStore,
};
use crate::domain::instance::{BlockDevice, Tag};
use crate::domain::{
    CloudError, InstanceDescription, InstanceHealth, LaunchRequest, RunSettings, SnapshotOwner,
    SnapshotRecord,
};
use crate::infra::command_runner::TokioCommandRunner;

/// Executable used when no override is configured.
pub const DEFAULT_AWS_CLI: &str = "aws";

#[allow(clippy::expect_used)] // Pattern is a compile-time constant
static CLI_ERROR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"An error occurred \(([^)]+)\) when calling the \w+ operation(?: \([^)]*\))?: (.*)")
        .expect("valid regex")
});

/// Authenticated cloud handle for one profile and region.
///
/// Generic over `R: CommandRunner` so that tests can inject a mock runner
/// without spawning real processes.
pub struct AwsCliContext<R: CommandRunner> {
    runner: R,
    program: String,
    profile: String,
    region: String,
}

impl<R: CommandRunner> AwsCliContext<R> {
    /// Create a context that runs `program` for the given run settings.
    pub fn new(runner: R, program: impl Into<String>, settings: &RunSettings) -> Self {
        Self {
            runner,
            program: program.into(),
            profile: settings.profile.clone(),
            region: settings.region.clone(),
        }
    }

    /// Region every call is scoped to.
    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Credentials profile every call runs under.
    #[must_use]
    pub fn profile(&self) -> &str {
        &self.profile
    }

    /// Run `aws ec2 <subcommand> <args>` and return its stdout.
    async fn ec2(&self, subcommand: &str, args: &[String], dry_run: bool) -> Result<Vec<u8>, CloudError> {
        let mut argv: Vec<&str> = vec!["ec2", subcommand];
        argv.extend(args.iter().map(String::as_str));
        if dry_run {
            argv.push("--dry-run");
        }
        argv.extend([
            "--region",
            self.region.as_str(),
            "--profile",
            self.profile.as_str(),
            "--output",
            "json",
            "--no-cli-pager",
        ]);

        tracing::debug!(program = %self.program, args = ?argv, "invoking cloud cli");
        let output = self.runner.run(&self.program, &argv).await?;
        if output.status.success() {
            return Ok(output.stdout);
        }
        Err(parse_cli_error(&String::from_utf8_lossy(&output.stderr)))
    }
}

impl AwsCliContext<TokioCommandRunner> {
    /// Convenience constructor for production use.
    #[must_use]
    pub fn default_runner(program: impl Into<String>, settings: &RunSettings) -> Self {
        Self::new(TokioCommandRunner::default(), program, settings)
    }
}

/// Map the client's stderr to a `CloudError`.
#[must_use]
pub fn parse_cli_error(stderr: &str) -> CloudError {
    match CLI_ERROR.captures(stderr) {
        Some(caps) => CloudError::from_code(&caps[1], caps[2].trim()),
        None => CloudError::Unrecognized(stderr.trim().to_string()),
    }
}

fn decode<T: DeserializeOwned>(operation: &'static str, stdout: &[u8]) -> Result<T, CloudError> {
    serde_json::from_slice(stdout).map_err(|source| CloudError::Decode { operation, source })
}

fn args<const N: usize>(items: [&str; N]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

// ── Response payloads ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeInstancesResponse {
    #[serde(default)]
    reservations: Vec<Reservation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Reservation {
    #[serde(default)]
    instances: Vec<Ec2Instance>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Ec2Instance {
    instance_id: String,
    image_id: String,
    #[serde(default)]
    subnet_id: Option<String>,
    #[serde(default)]
    security_groups: Vec<GroupIdentifier>,
    #[serde(default)]
    iam_instance_profile: Option<IamInstanceProfile>,
    #[serde(default)]
    root_device_name: Option<String>,
    #[serde(default)]
    block_device_mappings: Vec<BlockDeviceMapping>,
    #[serde(default)]
    tags: Vec<Tag>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GroupIdentifier {
    group_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct IamInstanceProfile {
    arn: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct BlockDeviceMapping {
    device_name: String,
    #[serde(default)]
    ebs: Option<EbsDevice>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct EbsDevice {
    volume_id: String,
}

impl From<Ec2Instance> for InstanceDescription {
    fn from(inst: Ec2Instance) -> Self {
        Self {
            instance_id: inst.instance_id,
            image_id: inst.image_id,
            subnet_id: inst.subnet_id,
            security_group_ids: inst.security_groups.into_iter().map(|g| g.group_id).collect(),
            iam_instance_profile_arn: inst.iam_instance_profile.map(|p| p.arn),
            root_device_name: inst.root_device_name,
            block_devices: inst
                .block_device_mappings
                .into_iter()
                .map(|bd| BlockDevice {
                    device_name: bd.device_name,
                    volume_id: bd.ebs.map(|e| e.volume_id),
                })
                .collect(),
            tags: inst.tags,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CreateSnapshotResponse {
    #[serde(default)]
    snapshot_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeSnapshotsResponse {
    #[serde(default)]
    snapshots: Vec<Ec2Snapshot>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Ec2Snapshot {
    snapshot_id: String,
    start_time: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RunInstancesResponse {
    #[serde(default)]
    instances: Vec<LaunchedInstance>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LaunchedInstance {
    instance_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeInstanceStatusResponse {
    #[serde(default)]
    instance_statuses: Vec<Ec2InstanceStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Ec2InstanceStatus {
    system_status: StatusSummary,
    instance_status: StatusSummary,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StatusSummary {
    status: String,
}

// ── Port implementations ──────────────────────────────────────────────────────

impl<R: CommandRunner> InstanceLifecycle for AwsCliContext<R> {
    async fn start_instance(&self, instance_id: &str, dry_run: bool) -> Result<(), CloudError> {
        self.ec2("start-instances", &args(["--instance-ids", instance_id]), dry_run)
            .await
            .map(drop)
    }

    async fn stop_instance(&self, instance_id: &str, dry_run: bool) -> Result<(), CloudError> {
        self.ec2("stop-instances", &args(["--instance-ids", instance_id]), dry_run)
            .await
            .map(drop)
    }

    async fn run_instance(
        &self,
        request: &LaunchRequest,
        dry_run: bool,
    ) -> Result<Option<String>, CloudError> {
        let stdout = self.ec2("run-instances", &launch_args(request), dry_run).await?;
        let resp: RunInstancesResponse = decode("run-instances", &stdout)?;
        Ok(resp.instances.into_iter().next().map(|i| i.instance_id))
    }
}

impl<R: CommandRunner> InstanceInspector for AwsCliContext<R> {
    async fn describe_instance(
        &self,
        instance_id: &str,
    ) -> Result<Option<InstanceDescription>, CloudError> {
        let stdout = self
            .ec2("describe-instances", &args(["--instance-ids", instance_id]), false)
            .await?;
        let resp: DescribeInstancesResponse = decode("describe-instances", &stdout)?;
        Ok(resp
            .reservations
            .into_iter()
            .next()
            .and_then(|r| r.instances.into_iter().next())
            .map(InstanceDescription::from))
    }

    async fn describe_instance_status(
        &self,
        instance_id: &str,
    ) -> Result<Option<InstanceHealth>, CloudError> {
        let stdout = self
            .ec2(
                "describe-instance-status",
                &args(["--instance-ids", instance_id]),
                false,
            )
            .await?;
        let resp: DescribeInstanceStatusResponse = decode("describe-instance-status", &stdout)?;
        Ok(resp.instance_statuses.into_iter().next().map(|s| InstanceHealth {
            system: s.system_status.status,
            instance: s.instance_status.status,
        }))
    }
}

impl<R: CommandRunner> SnapshotStore for AwsCliContext<R> {
    async fn create_snapshot(
        &self,
        volume_id: &str,
        description: &str,
        dry_run: bool,
    ) -> Result<Option<String>, CloudError> {
        let stdout = self
            .ec2(
                "create-snapshot",
                &args(["--volume-id", volume_id, "--description", description]),
                dry_run,
            )
            .await?;
        let resp: CreateSnapshotResponse = decode("create-snapshot", &stdout)?;
        Ok(resp.snapshot_id)
    }

    async fn delete_snapshot(&self, snapshot_id: &str, dry_run: bool) -> Result<(), CloudError> {
        self.ec2("delete-snapshot", &args(["--snapshot-id", snapshot_id]), dry_run)
            .await
            .map(drop)
    }

    async fn describe_snapshots(
        &self,
        owner: &SnapshotOwner,
    ) -> Result<Vec<SnapshotRecord>, CloudError> {
        let stdout = self
            .ec2(
                "describe-snapshots",
                &args(["--owner-ids", owner.as_filter()]),
                false,
            )
            .await?;
        let resp: DescribeSnapshotsResponse = decode("describe-snapshots", &stdout)?;
        Ok(resp
            .snapshots
            .into_iter()
            .map(|s| SnapshotRecord {
                snapshot_id: s.snapshot_id,
                start_time: s.start_time,
            })
            .collect())
    }
}

/// Build `run-instances` arguments for a single-instance launch.
#[must_use]
pub fn launch_args(request: &LaunchRequest) -> Vec<String> {
    let mut out = args([
        "--image-id",
        request.image_id.as_str(),
        "--instance-type",
        request.instance_type.as_str(),
        "--count",
        "1",
    ]);
    if let Some(subnet) = &request.subnet_id {
        out.extend(args(["--subnet-id", subnet.as_str()]));
    }
    if !request.security_group_ids.is_empty() {
        out.push("--security-group-ids".to_string());
        out.extend(request.security_group_ids.iter().cloned());
    }
    if !request.tags.is_empty() {
        let spec = serde_json::json!([{ "ResourceType": "instance", "Tags": request.tags }]);
        out.extend(["--tag-specifications".to_string(), spec.to_string()]);
    }
    if let Some(arn) = &request.iam_instance_profile_arn {
        out.extend(["--iam-instance-profile".to_string(), format!("Arn={arn}")]);
    }
    out
}
