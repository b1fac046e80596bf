//! YAML roster loading with variable substitution and schema validation.
//!
//! Both roster files are a mapping from a unique name to a definition:
//!
//! ```yaml
//! researcher:
//!   role: "{topic} Senior Data Researcher"
//!   goal: "Uncover cutting-edge developments in {topic}"
//!   backstory: "You're a seasoned researcher."
//! ```
//!
//! Files are parsed first and placeholders are substituted in the parsed string
//! values, once, so a variable value can neither change the document structure
//! nor be expanded again. Definitions are checked once; every missing or
//! mistyped field across all entries is reported in a single
//! [`ConfigError::Schema`].

use std::cell::RefCell;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::project::variables::VariableSet;
use crate::utilities::errors::{BuildError, ConfigError};
use crate::utilities::string_utils::{interpolate_only, replace_placeholders, TemplateError};

/// A template field whose markers could not all be filled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedField {
    pub field: &'static str,
    pub error: TemplateError,
}

impl UnresolvedField {
    fn into_build_error(self) -> BuildError {
        BuildError::Template {
            field: self.field,
            source: self.error,
        }
    }
}

/// An agent definition from the agents file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Unique key of the agent in the file.
    pub name: String,
    pub role: String,
    pub goal: String,
    pub backstory: String,
    /// Fields left as raw templates because a variable was missing.
    #[serde(skip)]
    pub unresolved: Vec<UnresolvedField>,
}

/// A task definition from the tasks file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskConfig {
    /// Unique key of the task in the file.
    pub name: String,
    pub description: String,
    pub expected_output: String,
    /// Name of the agent that performs this task.
    pub agent: String,
    /// Where the engine should also write the task's output. Markers without a
    /// value are kept as written.
    pub output_file: Option<String>,
    #[serde(skip)]
    pub unresolved: Vec<UnresolvedField>,
}

impl AgentConfig {
    /// Load all agent definitions from `path`, in file order.
    pub fn load_all(path: &Path, variables: &VariableSet) -> Result<Vec<Self>, ConfigError> {
        load_definitions(path, variables, |name, fields| {
            let role = fields.template("role");
            let goal = fields.template("goal");
            let backstory = fields.template("backstory");
            Some(AgentConfig {
                name: name.to_string(),
                role: role?,
                goal: goal?,
                backstory: backstory?,
                unresolved: fields.take_unresolved(),
            })
        })
    }

    /// Fails with the first field that still references a missing variable.
    pub fn check_resolved(&self) -> Result<(), BuildError> {
        first_unresolved(&self.unresolved)
    }
}

impl TaskConfig {
    /// Load all task definitions from `path`, in file order.
    pub fn load_all(path: &Path, variables: &VariableSet) -> Result<Vec<Self>, ConfigError> {
        load_definitions(path, variables, |name, fields| {
            let description = fields.template("description");
            let expected_output = fields.template("expected_output");
            let agent = fields.required("agent");
            let output_file = fields.optional("output_file");
            Some(TaskConfig {
                name: name.to_string(),
                description: description?,
                expected_output: expected_output?,
                agent: agent?,
                output_file: output_file?,
                unresolved: fields.take_unresolved(),
            })
        })
    }

    /// Fails with the first field that still references a missing variable.
    pub fn check_resolved(&self) -> Result<(), BuildError> {
        first_unresolved(&self.unresolved)
    }
}

fn first_unresolved(unresolved: &[UnresolvedField]) -> Result<(), BuildError> {
    match unresolved.first() {
        Some(field) => Err(field.clone().into_build_error()),
        None => Ok(()),
    }
}

/// Read `path`, parse it as a YAML mapping and substitute known placeholders in
/// every string value. Markers without a value are left in place.
///
/// An empty document yields an empty mapping. Failures are logged and returned.
pub fn load_yaml_with_variables(
    path: &Path,
    variables: &VariableSet,
) -> Result<Mapping, ConfigError> {
    let mut mapping = load_yaml_mapping(path)?;
    for (_, value) in mapping.iter_mut() {
        substitute_strings(value, variables);
    }
    Ok(mapping)
}

fn substitute_strings(value: &mut Value, variables: &VariableSet) {
    match value {
        Value::String(text) => *text = replace_placeholders(text, variables),
        Value::Sequence(items) => items
            .iter_mut()
            .for_each(|item| substitute_strings(item, variables)),
        Value::Mapping(mapping) => mapping
            .iter_mut()
            .for_each(|(_, item)| substitute_strings(item, variables)),
        Value::Tagged(tagged) => substitute_strings(&mut tagged.value, variables),
        _ => {}
    }
}

/// Read and parse `path` without substitution.
fn load_yaml_mapping(path: &Path) -> Result<Mapping, ConfigError> {
    if !path.exists() {
        log::error!("File not found: {}", path.display());
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| {
        log::error!("Error reading YAML file {}: {}", path.display(), source);
        ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }
    })?;

    let document: Value = serde_yaml::from_str(&content).map_err(|source| {
        log::error!("Error loading YAML file {}: {}", path.display(), source);
        ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        }
    })?;

    match document {
        Value::Null => Ok(Mapping::new()),
        Value::Mapping(mapping) => Ok(mapping),
        _ => {
            log::error!("YAML file {} is not a mapping", path.display());
            Err(ConfigError::NotAMapping {
                path: path.to_path_buf(),
            })
        }
    }
}

/// Field access for one entry that records problems instead of failing fast.
struct EntryFields<'a> {
    entry: &'a str,
    mapping: &'a Mapping,
    variables: &'a VariableSet,
    problems: &'a RefCell<Vec<String>>,
    unresolved: RefCell<Vec<UnresolvedField>>,
}

impl EntryFields<'_> {
    fn required(&self, field: &str) -> Option<String> {
        match self.mapping.get(field) {
            None | Some(Value::Null) => {
                self.problem(format!("missing required field `{}`", field));
                None
            }
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                self.problem(format!("field `{}` must be a string", field));
                None
            }
        }
    }

    /// A required field with every marker filled in one pass. On a missing
    /// variable the raw text is kept and the field is recorded as unresolved.
    fn template(&self, field: &'static str) -> Option<String> {
        let raw = self.required(field)?;
        match interpolate_only(&raw, self.variables) {
            Ok(text) => Some(text),
            Err(error) => {
                self.unresolved
                    .borrow_mut()
                    .push(UnresolvedField { field, error });
                Some(raw)
            }
        }
    }

    fn optional(&self, field: &str) -> Option<Option<String>> {
        match self.mapping.get(field) {
            None | Some(Value::Null) => Some(None),
            Some(Value::String(s)) => Some(Some(replace_placeholders(s, self.variables))),
            Some(_) => {
                self.problem(format!("field `{}` must be a string", field));
                None
            }
        }
    }

    fn take_unresolved(&self) -> Vec<UnresolvedField> {
        self.unresolved.take()
    }

    fn problem(&self, message: String) {
        self.problems
            .borrow_mut()
            .push(format!("{}: {}", self.entry, message));
    }
}

fn load_definitions<T>(
    path: &Path,
    variables: &VariableSet,
    build: impl Fn(&str, &EntryFields<'_>) -> Option<T>,
) -> Result<Vec<T>, ConfigError> {
    let mapping = load_yaml_mapping(path)?;

    let mut definitions = Vec::with_capacity(mapping.len());
    let problems: RefCell<Vec<String>> = RefCell::new(Vec::new());

    for (key, value) in &mapping {
        let name = match key {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => {
                problems
                    .borrow_mut()
                    .push(format!("{:?}: entry names must be strings", key));
                continue;
            }
        };

        let Value::Mapping(fields) = value else {
            problems
                .borrow_mut()
                .push(format!("{}: expected a mapping of fields", name));
            continue;
        };

        let entry = EntryFields {
            entry: &name,
            mapping: fields,
            variables,
            problems: &problems,
            unresolved: RefCell::new(Vec::new()),
        };
        if let Some(definition) = build(&name, &entry) {
            definitions.push(definition);
        }
    }

    let problems = problems.into_inner();
    if !problems.is_empty() {
        for problem in &problems {
            log::error!("{}: {}", path.display(), problem);
        }
        return Err(ConfigError::Schema {
            path: path.to_path_buf(),
            problems,
        });
    }

    Ok(definitions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn yaml_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn topic(value: &str) -> VariableSet {
        let mut vars = VariableSet::new();
        vars.insert("topic", value);
        vars
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = load_yaml_with_variables(Path::new("/no/such/agents.yml"), &VariableSet::new())
            .unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn test_empty_file_is_empty_mapping() {
        let file = yaml_file("");
        let mapping = load_yaml_with_variables(file.path(), &VariableSet::new()).unwrap();
        assert!(mapping.is_empty());
        assert!(AgentConfig::load_all(file.path(), &VariableSet::new())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_unparseable_file_is_yaml_error() {
        let file = yaml_file("researcher: [unclosed\n");
        let err = load_yaml_with_variables(file.path(), &VariableSet::new()).unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }

    #[test]
    fn test_sequence_is_not_a_mapping() {
        let file = yaml_file("- one\n- two\n");
        let err = load_yaml_with_variables(file.path(), &VariableSet::new()).unwrap_err();
        assert!(matches!(err, ConfigError::NotAMapping { .. }));
    }

    #[test]
    fn test_fields_are_substituted_once() {
        let file = yaml_file(
            "researcher:\n  role: \"{topic} Researcher\"\n  goal: Study {topic}\n  backstory: Curious about {audience}\n",
        );
        let agents = AgentConfig::load_all(file.path(), &topic("Quantum")).unwrap();
        assert_eq!(agents.len(), 1);
        assert_eq!(agents[0].name, "researcher");
        assert_eq!(agents[0].role, "Quantum Researcher");
        assert_eq!(agents[0].goal, "Study Quantum");
        assert_eq!(agents[0].backstory, "Curious about {audience}");

        let err = agents[0].check_resolved().unwrap_err();
        assert_eq!(
            err.to_string(),
            "field `backstory`: Template variable(s) not found in inputs: audience"
        );
    }

    #[test]
    fn test_values_with_markers_are_not_expanded_again() {
        let file = yaml_file("a:\n  role: \"{topic} expert\"\n  goal: g\n  backstory: b\n");

        let agents = AgentConfig::load_all(file.path(), &topic("C++ {templates}")).unwrap();
        assert_eq!(agents[0].role, "C++ {templates} expert");
        assert!(agents[0].check_resolved().is_ok());

        let mut vars = topic("literal {audience}");
        vars.insert("audience", "kids");
        let agents = AgentConfig::load_all(file.path(), &vars).unwrap();
        assert_eq!(agents[0].role, "literal {audience} expert");
    }

    #[test]
    fn test_values_cannot_break_yaml_structure() {
        let file = yaml_file("a:\n  role: Analyst\n  goal: Study {topic}\n  backstory: b\n");
        let vars = topic("AI: the next \"decade\"\nrole: hijacked");

        let agents = AgentConfig::load_all(file.path(), &vars).unwrap();
        assert_eq!(agents[0].role, "Analyst");
        assert_eq!(agents[0].goal, "Study AI: the next \"decade\"\nrole: hijacked");

        let mapping = load_yaml_with_variables(file.path(), &vars).unwrap();
        let entry = mapping.get("a").and_then(Value::as_mapping).unwrap();
        assert_eq!(entry.get("role").and_then(Value::as_str), Some("Analyst"));
        assert_eq!(
            entry.get("goal").and_then(Value::as_str),
            Some("Study AI: the next \"decade\"\nrole: hijacked")
        );
    }

    #[test]
    fn test_output_file_keeps_unknown_markers() {
        let file = yaml_file(
            "t:\n  description: d\n  expected_output: e\n  agent: a\n  output_file: \"out/{topic}_{date}.md\"\n",
        );
        let tasks = TaskConfig::load_all(file.path(), &topic("ai")).unwrap();
        assert_eq!(tasks[0].output_file.as_deref(), Some("out/ai_{date}.md"));
        assert!(tasks[0].check_resolved().is_ok());
    }

    #[test]
    fn test_tasks_keep_file_order() {
        let file = yaml_file(
            "zeta:\n  description: d1\n  expected_output: e1\n  agent: a\nalpha:\n  description: d2\n  expected_output: e2\n  agent: a\n  output_file: out/report.md\n",
        );
        let tasks = TaskConfig::load_all(file.path(), &VariableSet::new()).unwrap();
        let names: Vec<&str> = tasks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
        assert_eq!(tasks[0].output_file, None);
        assert_eq!(tasks[1].output_file.as_deref(), Some("out/report.md"));
    }

    #[test]
    fn test_schema_reports_all_problems() {
        let file = yaml_file(
            "first:\n  description: d\nsecond:\n  description: 12\n  expected_output: e\n  agent: a\n  output_file: [x]\nthird: just text\n",
        );
        let err = TaskConfig::load_all(file.path(), &VariableSet::new()).unwrap_err();
        let ConfigError::Schema { problems, .. } = err else {
            panic!("expected schema error, got {:?}", err);
        };
        assert_eq!(
            problems,
            vec![
                "first: missing required field `expected_output`".to_string(),
                "first: missing required field `agent`".to_string(),
                "second: field `description` must be a string".to_string(),
                "second: field `output_file` must be a string".to_string(),
                "third: expected a mapping of fields".to_string(),
            ]
        );
    }

    #[test]
    fn test_bundled_demo_rosters_load() {
        let demos = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos");
        let mut vars = VariableSet::new();
        vars.insert("topic", "Rust");

        let agents = AgentConfig::load_all(&demos.join("agents.yml"), &vars).unwrap();
        let names: Vec<&str> = agents.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["researcher", "reporting_analyst"]);
        assert!(agents[0].role.starts_with("Rust Senior Data Researcher"));

        let tasks = TaskConfig::load_all(&demos.join("tasks.yml"), &vars).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[1].agent, "reporting_analyst");
        assert_eq!(tasks[1].output_file.as_deref(), Some("report.md"));
    }
}
