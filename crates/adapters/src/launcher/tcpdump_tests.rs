// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn argv(cmd: &Command) -> Vec<String> {
    let std_cmd = cmd.as_std();
    std::iter::once(std_cmd.get_program())
        .chain(std_cmd.get_args())
        .map(|s| s.to_string_lossy().into_owned())
        .collect()
}

fn spec(n: u32) -> CaptureSpec {
    CaptureSpec::new(n).unwrap()
}

#[test]
fn host_network_runs_tool_directly() {
    let launcher = TcpdumpLauncher::default();
    let cmd = launcher.command(
        &CaptureTarget::HostNetwork,
        &spec(3),
        Path::new("/captures/capture-ns_p1.pcap"),
    );
    assert_eq!(
        argv(&cmd),
        [
            "tcpdump",
            "-i",
            "any",
            "-U",
            "-n",
            "-C",
            "1",
            "-W",
            "3",
            "-w",
            "/captures/capture-ns_p1.pcap",
            "-Z",
            "root"
        ]
    );
}

#[test]
fn namespace_target_wraps_in_nsenter() {
    let launcher = TcpdumpLauncher {
        tool: PathBuf::from("/usr/sbin/tcpdump"),
        rotate_size_mb: 10,
        ..TcpdumpLauncher::default()
    };
    let cmd = launcher.command(
        &CaptureTarget::NetNamespace { pid: 4242 },
        &spec(5),
        Path::new("/data/capture-a_b.pcap"),
    );
    let args = argv(&cmd);
    assert_eq!(
        &args[..6],
        ["nsenter", "-t", "4242", "-n", "--", "/usr/sbin/tcpdump"]
    );
    assert!(args.windows(2).any(|w| w == ["-C", "10"]));
    assert!(args.windows(2).any(|w| w == ["-W", "5"]));
}
