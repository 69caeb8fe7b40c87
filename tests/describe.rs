use std::ffi::OsStr;
use std::io::{self, Write};
use std::process::{Command, Output, Stdio};

use sqldescribe::{extract, Target, WindowConfig};

const DUMP: &str = "-- MySQL dump 10.13  Distrib 5.5.34
--
-- Table structure for table `actions`
--

DROP TABLE IF EXISTS `actions`;
/*!40101 SET @saved_cs_client     = @@character_set_client */;
/*!40101 SET character_set_client = utf8 */;
CREATE TABLE `actions` (
  `aid` varchar(255) NOT NULL DEFAULT '0' COMMENT 'Primary Key: Unique actions ID.',
  `type` varchar(32) NOT NULL DEFAULT '' COMMENT 'Action object (ie: node, user, ...)',
  `callback` varchar(255) NOT NULL DEFAULT '' COMMENT 'Callback function.',
  `parameters` longblob NOT NULL COMMENT 'Parameters to be passed to the callback function.',
  `label` varchar(255) NOT NULL DEFAULT '0' COMMENT 'Label of the action.',
  PRIMARY KEY (`aid`)
) ENGINE=InnoDB DEFAULT CHARSET=utf8 COMMENT='Stores action information.';
/*!40101 SET character_set_client = @saved_cs_client */;

LOCK TABLES `actions` WRITE;
INSERT INTO `actions` VALUES ('comment_publish_action','comment','comment_publish_action','','Publish comment; CREATE TABLE `batch` (');
UNLOCK TABLES;

DROP TABLE IF EXISTS `batch`;
CREATE TABLE `batch` (
  `bid` int(10) unsigned NOT NULL AUTO_INCREMENT COMMENT 'Primary Key: Unique batch ID.',
  `token` varchar(64) NOT NULL COMMENT 'A string token generated against the current user''s session id and the batch id.',
  PRIMARY KEY (`bid`),
  KEY `token` (`token`)
) ENGINE=InnoDB DEFAULT CHARSET=utf8 COMMENT='Stores details about batches.';
";

const ACTIONS: &str = "CREATE TABLE `actions` (
  `aid` varchar(255) NOT NULL DEFAULT '0' COMMENT 'Primary Key: Unique actions ID.',
  `type` varchar(32) NOT NULL DEFAULT '' COMMENT 'Action object (ie: node, user, ...)',
  `callback` varchar(255) NOT NULL DEFAULT '' COMMENT 'Callback function.',
  `parameters` longblob NOT NULL COMMENT 'Parameters to be passed to the callback function.',
  `label` varchar(255) NOT NULL DEFAULT '0' COMMENT 'Label of the action.',
  PRIMARY KEY (`aid`)
) ENGINE=InnoDB DEFAULT CHARSET=utf8 COMMENT='Stores action information.';
";

const BATCH: &str = "CREATE TABLE `batch` (
  `bid` int(10) unsigned NOT NULL AUTO_INCREMENT COMMENT 'Primary Key: Unique batch ID.',
  `token` varchar(64) NOT NULL COMMENT 'A string token generated against the current user''s session id and the batch id.',
  PRIMARY KEY (`bid`),
  KEY `token` (`token`)
) ENGINE=InnoDB DEFAULT CHARSET=utf8 COMMENT='Stores details about batches.';
";

fn describe(table: &str) -> String {
    let mut out = Vec::new();
    let target = Target::new(table.as_bytes()).unwrap();
    extract(DUMP.as_bytes(), target, &mut out, WindowConfig::DEFAULT).unwrap();
    String::from_utf8(out).unwrap()
}

fn sqldescribe(args: &[&str], stdin: &str) -> Output {
    sqldescribe_bytes(args, stdin.as_bytes())
}

fn sqldescribe_bytes<S: AsRef<OsStr>>(args: &[S], stdin: &[u8]) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_sqldescribe"))
        .args(args)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    {
        let mut input = child.stdin.take().unwrap();
        // the process may exit without reading its input
        if let Err(err) = input.write_all(stdin) {
            assert_eq!(io::ErrorKind::BrokenPipe, err.kind());
        }
    }
    child.wait_with_output().unwrap()
}

#[test]
fn mysql_dump() {
    assert_eq!(ACTIONS, describe("actions"));
    // doubled quotes toggle twice, which leaves the literal closed
    assert_eq!(BATCH, describe("batch"));
    assert_eq!("", describe("action"));
}

#[test]
fn large_dump() {
    let mut dump = String::new();
    for i in 0..2000 {
        dump.push_str(&format!(
            "CREATE TABLE `t{i}` (\n  `id` int COMMENT 'CREATE TABLE `target` (',\n  -- CREATE TABLE `target` (\n  /* ; */ `v` int\n);\n"
        ));
    }
    dump.push_str(ACTIONS);
    let mut out = Vec::new();
    let target = Target::new(b"actions").unwrap();
    assert!(extract(dump.as_bytes(), target, &mut out, WindowConfig::new(256, 64)).unwrap());
    assert_eq!(ACTIONS.as_bytes(), out.as_slice());

    let target = Target::new(b"target").unwrap();
    out.clear();
    assert!(!extract(dump.as_bytes(), target, &mut out, WindowConfig::DEFAULT).unwrap());
    assert!(out.is_empty());
}

#[test]
fn binary_prints_statement() {
    let output = sqldescribe(&["batch"], DUMP);
    assert!(output.status.success());
    assert_eq!(BATCH, String::from_utf8(output.stdout).unwrap());
}

#[test]
fn binary_no_match() {
    let output = sqldescribe(&["missing"], DUMP);
    assert!(output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn binary_usage() {
    let output = sqldescribe(&[], DUMP);
    assert_eq!(Some(2), output.status.code());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("Usage "));
    assert!(stdout.ends_with("tablename. < file\n"));

    let output = sqldescribe(&["actions", "batch"], DUMP);
    assert_eq!(Some(2), output.status.code());
}

#[test]
fn binary_empty_name() {
    let output = sqldescribe(&[" "], DUMP);
    assert_eq!(Some(1), output.status.code());
    assert!(output.stdout.is_empty());
    assert_eq!("Err: empty table name\n", String::from_utf8(output.stderr).unwrap());
}

#[cfg(unix)]
#[test]
fn binary_latin1_name() {
    use std::os::unix::ffi::OsStrExt;

    let name = OsStr::from_bytes(b"caf\xe9");
    let input = b"CREATE TABLE `cafe` (b);\nCREATE TABLE `caf\xe9` (a);\n";
    let output = sqldescribe_bytes(&[name], input);
    assert!(output.status.success());
    assert_eq!(&b"CREATE TABLE `caf\xe9` (a);\n"[..], output.stdout.as_slice());
}
