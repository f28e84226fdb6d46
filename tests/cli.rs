// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

extern crate assert_cmd;
extern crate predicates;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

fn mandel() -> Command {
    Command::cargo_bin("mandel").unwrap()
}

#[test]
fn renders_a_small_frame() {
    mandel()
        .args(&["--size", "64x36", "--zoom", "0.08", "--threads", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("64x36 points frame, generation 1"))
        .stdout(predicate::str::contains("inside the set"));
}

#[test]
fn renders_into_a_raster() {
    mandel()
        .args(&["-s", "40x20", "-z", "0.12", "-t", "1", "-b", "raster"])
        .assert()
        .success()
        .stdout(predicate::str::contains("40x20 raster frame"));
}

#[test]
fn prints_a_preview_with_the_set_in_the_middle() {
    mandel()
        .args(&["--size", "80x40", "--zoom", "0.06", "--threads", "1", "--preview", "20x10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("@"));
}

#[test]
fn accepts_negative_offsets() {
    mandel()
        .args(&["--size", "32x32", "--offset", "-0.5,-0.25", "--iterations", "50", "--threads", "1"])
        .assert()
        .success();
}

#[test]
fn rejects_zero_threads() {
    mandel()
        .args(&["--size", "32x32", "--threads", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Thread count must be between"));
}

#[test]
fn rejects_an_empty_grid() {
    mandel()
        .args(&["--size", "0x10", "--threads", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Render failure"));
}
