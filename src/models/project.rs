// Project, benchmark and dependency models
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub python_version: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Benchmark {
    pub id: i64,
    pub project_id: i64,
    pub name: String,
    pub path: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LocalDependency {
    pub module_name: String,
    pub file_path: String,
    pub exists: bool,
    #[serde(default)]
    pub children: Vec<LocalDependency>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExternalPackage {
    pub name: String,
    pub in_pyproject: bool,
}

/// Import graph of a benchmark file, computed by the backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DependencyAnalysis {
    pub root: String,
    pub local_files: Vec<LocalDependency>,
    pub external_packages: Vec<ExternalPackage>,
}

impl DependencyAnalysis {
    /// Number of local files that exist on disk, counting nested imports
    pub fn local_file_count(&self) -> usize {
        fn count(deps: &[LocalDependency]) -> usize {
            deps.iter()
                .map(|d| usize::from(d.exists) + count(&d.children))
                .sum()
        }
        count(&self.local_files)
    }

    /// External packages not yet declared in pyproject.toml
    pub fn missing_packages(&self) -> Vec<&str> {
        self.external_packages
            .iter()
            .filter(|p| !p.in_pyproject)
            .map(|p| p.name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dep(name: &str, exists: bool, children: Vec<LocalDependency>) -> LocalDependency {
        LocalDependency {
            module_name: name.to_string(),
            file_path: format!("{}.py", name),
            exists,
            children,
        }
    }

    #[test]
    fn test_local_file_count_walks_tree() {
        let analysis = DependencyAnalysis {
            root: "bench.py".to_string(),
            local_files: vec![
                dep("utils", true, vec![dep("utils_io", true, vec![]), dep("gone", false, vec![])]),
                dep("model", true, vec![]),
            ],
            external_packages: vec![
                ExternalPackage { name: "numpy".to_string(), in_pyproject: true },
                ExternalPackage { name: "gurobipy".to_string(), in_pyproject: false },
            ],
        };

        assert_eq!(analysis.local_file_count(), 3);
        assert_eq!(analysis.missing_packages(), vec!["gurobipy"]);
    }
}
