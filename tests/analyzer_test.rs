//! End-to-end analyzer tests: load Go sources, run the full pipeline,
//! check findings and reporter output.

use std::fs;
use std::path::Path;

use leakhound::config::{Config, MethodConfig, TargetConfig};
use leakhound::detector::{self, Finding, RuleId};
use leakhound::loader;
use leakhound::report::{self, Format, ReportedFinding};

fn analyze_source(source: &str, config: Option<&Config>) -> Vec<Finding> {
    let pass =
        loader::parse_package_from_sources("example.com/demo", &[("main.go", source)]).unwrap();
    detector::analyze(&pass, config).unwrap()
}

const DATAFLOW_SOURCE: &str = r#"
package main

import (
	"context"
	"fmt"
	"log"
	"log/slog"
)

type User struct {
	Name     string
	Password string `sensitive:"true"`
}

type Config struct {
	APIKey string `sensitive:"true"`
	Region string
}

func basicAssignment() {
	user := User{Name: "alice", Password: "secret123"}
	password := user.Password
	slog.Info("msg", "pass", password)
}

func assignmentWithLog() {
	user := User{Name: "bob", Password: "secret456"}
	p := user.Password
	log.Println("password:", p)
}

func assignmentWithFmt() {
	config := Config{APIKey: "key123", Region: "us-east-1"}
	secret := config.APIKey
	fmt.Printf("secret: %s", secret)
}

func pointerDereference() {
	user := &User{Name: "charlie", Password: "secret789"}
	password := user.Password
	slog.Info("msg", "pass", password)
}

func loggerMethods() {
	user := User{Name: "eve", Password: "secretDEF"}
	password := user.Password
	logger := slog.Default()
	logger.Info("msg", "pass", password)
	custom := log.Default()
	custom.Println("password:", password)
}

func logWithContext(ctx context.Context, msg string) {
	slog.InfoContext(ctx, "msg", "data", msg)
}

func multiParameter() {
	config := Config{APIKey: "keyXYZ", Region: "eu-west-1"}
	secret := config.APIKey
	logWithContext(context.Background(), secret)
}
"#;

#[test]
fn test_dataflow_scenarios() {
    let findings = analyze_source(DATAFLOW_SOURCE, None);
    let vars: Vec<&str> = findings
        .iter()
        .filter(|f| f.rule == RuleId::SensitiveVar)
        .map(|f| f.message.as_str())
        .collect();

    // basicAssignment, assignmentWithLog, assignmentWithFmt,
    // pointerDereference, two logger methods, and the propagated
    // parameter inside logWithContext.
    assert_eq!(findings.len(), 7);
    assert_eq!(vars.len(), 7);
    assert!(vars.iter().any(|m| m.contains("\"password\"") && m.contains("User.Password")));
    assert!(vars.iter().any(|m| m.contains("\"p\"") && m.contains("User.Password")));
    assert!(vars.iter().any(|m| m.contains("\"secret\"") && m.contains("Config.APIKey")));
    assert!(vars.iter().any(|m| m.contains("\"msg\"") && m.contains("Config.APIKey")));
}

#[test]
fn test_return_value_scenarios() {
    let findings = analyze_source(
        r#"
package main

import "log/slog"

type User struct {
	Password string `sensitive:"true"`
}

func getPassword(user User) string {
	return user.Password
}

func useViaVariable() {
	user := User{Password: "a"}
	password := getPassword(user)
	slog.Info("msg", password)
}

func useDirectly() {
	user := User{Password: "b"}
	slog.Info("msg", getPassword(user))
}
"#,
        None,
    );
    assert_eq!(findings.len(), 2);
    assert_eq!(findings[0].rule, RuleId::SensitiveVar);
    assert_eq!(findings[1].rule, RuleId::SensitiveCall);
}

#[test]
fn test_method_return_value() {
    let findings = analyze_source(
        r#"
package main

import "log/slog"

type Vault struct {
	secret string `sensitive:"true"`
}

func (v Vault) Secret() string {
	return v.secret
}

func run() {
	v := Vault{secret: "s"}
	secret := v.Secret()
	slog.Info("msg", secret)
}
"#,
        None,
    );
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].rule, RuleId::SensitiveVar);
    assert!(findings[0].message.contains("Vault.secret"));
}

#[test]
fn test_parameter_chain_depth_three() {
    let findings = analyze_source(
        r#"
package main

import "log"

type User struct {
	Password string `sensitive:"true"`
}

func level3(v string) {
	log.Println(v)
}

func level2(v string) {
	level3(v)
}

func level1(v string) {
	level2(v)
}

func run() {
	u := User{Password: "x"}
	p := u.Password
	level1(p)
}
"#,
        None,
    );
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].rule, RuleId::SensitiveVar);
    assert!(findings[0].message.contains("\"v\""));
    assert!(findings[0].message.contains("User.Password"));
}

#[test]
fn test_negative_scenarios() {
    let findings = analyze_source(
        r#"
package main

import (
	"log/slog"

	"example.com/foreignpkg"
)

type User struct {
	Name     string
	Password string `sensitive:"true"`
}

func nonSensitiveField() {
	user := User{Name: "oscar", Password: "x"}
	name := user.Name
	slog.Info("msg", "name", name)
}

func literalValue() {
	password := "hardcoded-password"
	slog.Info("msg", "pass", password)
}

func notLogged() {
	user := User{Name: "paul", Password: "x"}
	password := user.Password
	_ = password
	slog.Info("msg", "name", user.Name)
}

func crossPackageSink() {
	user := User{Password: "x"}
	foreignpkg.Log(user.Password)
}

func scopedShadowing() {
	user := User{Name: "quinn", Password: "x"}
	func() {
		name := user.Name
		slog.Info("msg", "name", name)
	}()
	func() {
		name := user.Password
		_ = name
	}()
}
"#,
        None,
    );
    assert!(findings.is_empty(), "unexpected findings: {findings:?}");
}

#[test]
fn test_configured_custom_logger() {
    let config = Config {
        targets: vec![TargetConfig {
            package: "example.com/demo".into(),
            functions: vec!["Record".into()],
            methods: vec![MethodConfig {
                receiver: "*CustomLogger".into(),
                names: vec!["Info".into()],
            }],
        }],
    };
    let source = r#"
package main

type CustomLogger struct{}

func NewLogger() *CustomLogger {
	return &CustomLogger{}
}

func (l *CustomLogger) Info(args ...interface{}) {}

func Record(args ...interface{}) {}

type Account struct {
	Token string `sensitive:"true"`
}

func run() {
	a := Account{Token: "t"}
	l := NewLogger()
	l.Info("token", a.Token)
}
"#;
    // Without configuration nothing is a sink.
    assert!(analyze_source(source, None).is_empty());

    let findings = analyze_source(source, Some(&config));
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].rule, RuleId::SensitiveField);
    assert!(findings[0].message.contains("Account.Token"));
}

#[test]
fn test_idempotence_and_determinism() {
    let first = analyze_source(DATAFLOW_SOURCE, None);
    let second = analyze_source(DATAFLOW_SOURCE, None);
    assert_eq!(first, second);
}

#[test]
fn test_declaration_order_does_not_change_findings() {
    // The sink-bearing function precedes the type declarations here; the
    // field catalog is frozen before seeding either way.
    let findings = analyze_source(
        r#"
package main

import "log/slog"

func run() {
	u := User{Password: "x"}
	p := u.Password
	slog.Info("m", p)
}

type User struct {
	Password string `sensitive:"true"`
}
"#,
        None,
    );
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].rule, RuleId::SensitiveVar);
}

#[test]
fn test_full_pipeline_from_disk_with_text_output() {
    let tmp = tempfile::tempdir().unwrap();
    fs::write(tmp.path().join("go.mod"), "module example.com/svc\n").unwrap();
    fs::write(
        tmp.path().join("main.go"),
        r#"package main

import "log/slog"

type Creds struct {
	Key string `sensitive:"true"`
}

func main() {
	c := Creds{Key: "k"}
	slog.Info("boot", c.Key)
}
"#,
    )
    .unwrap();

    let passes = loader::load_packages(&[tmp.path().to_string_lossy().to_string()]).unwrap();
    assert_eq!(passes.len(), 1);
    let findings = detector::analyze(&passes[0], None).unwrap();
    assert_eq!(findings.len(), 1);

    let reported: Vec<ReportedFinding> = findings
        .iter()
        .map(|f| ReportedFinding {
            path: relative_display(passes[0].fset.name(f.pos.file), tmp.path()),
            line: f.pos.line,
            column: f.pos.column,
            message: f.message.clone(),
            rule: f.rule,
        })
        .collect();

    let mut buf = Vec::new();
    report::write_findings(&mut buf, Format::Text, &reported).unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert_eq!(
        text,
        "main.go:11:20: sensitive field 'Creds.Key' should not be logged (tagged with sensitive:\"true\")\n"
    );
}

#[test]
fn test_full_pipeline_sarif_output() {
    let findings = analyze_source(
        r#"
package main

import "log/slog"

type User struct {
	Password string `sensitive:"true"`
}

func run() {
	u := User{Password: "x"}
	p := u.Password
	slog.Info("m", p)
}
"#,
        None,
    );
    let reported: Vec<ReportedFinding> = findings
        .iter()
        .map(|f| ReportedFinding {
            path: "main.go".into(),
            line: f.pos.line,
            column: f.pos.column,
            message: f.message.clone(),
            rule: f.rule,
        })
        .collect();

    let mut buf = Vec::new();
    report::write_findings(&mut buf, Format::Sarif, &reported).unwrap();
    let doc: serde_json::Value = serde_json::from_slice(&buf).unwrap();

    assert_eq!(doc["version"], "2.1.0");
    let run = &doc["runs"][0];
    assert_eq!(run["tool"]["driver"]["name"], "leakhound");
    assert_eq!(run["automationDetails"]["id"], "leakhound/analysis");
    let result = &run["results"][0];
    assert_eq!(result["ruleId"], "LH0001");
    assert_eq!(result["level"], "error");
    assert_eq!(
        result["locations"][0]["physicalLocation"]["artifactLocation"]["uriBaseId"],
        "%SRCROOT%"
    );
    let hash = result["partialFingerprints"]["primaryLocationLineHash"]
        .as_str()
        .unwrap();
    assert_eq!(hash.len(), 32);
}

#[test]
fn test_cross_package_struct_sensitivity() {
    let tmp = tempfile::tempdir().unwrap();
    fs::create_dir_all(tmp.path().join("models")).unwrap();
    fs::write(tmp.path().join("go.mod"), "module example.com/app\n").unwrap();
    fs::write(
        tmp.path().join("models/model.go"),
        r#"package models

type Data struct {
	Token string `sensitive:"true"`
}
"#,
    )
    .unwrap();
    fs::write(
        tmp.path().join("main.go"),
        r#"package main

import (
	"log/slog"

	"example.com/app/models"
)

func run(d models.Data) {
	slog.Info("d", d)
	slog.Info("t", d.Token)
}
"#,
    )
    .unwrap();

    let pattern = format!("{}/...", tmp.path().to_string_lossy());
    let passes = loader::load_packages(&[pattern]).unwrap();
    let main_pass = passes
        .iter()
        .find(|p| p.pkg == "example.com/app")
        .expect("main package loaded");
    let findings = detector::analyze(main_pass, None).unwrap();
    assert_eq!(findings.len(), 2);
    assert_eq!(findings[0].rule, RuleId::SensitiveStruct);
    assert_eq!(findings[1].rule, RuleId::SensitiveField);
    assert!(findings[1].message.contains("Data.Token"));
}

fn relative_display(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .to_string_lossy()
        .to_string()
}
