//! A test case directory: every file with the input extension is paired
//! with a sibling sharing its stem and the output extension.
//!
//! Grounded on `original_source/src/testcase.{h,cpp}` field-for-field
//! (`id_`, `input_path_`, `output_path_`, `TestCaseContainer::Initialize`/
//! `AddTestCaseFile`).

use std::path::{Path, PathBuf};

use crate::{Error, ErrorKind, Result};

/// One input/expected-output pair, identified by its position in the
/// container.
#[derive(Clone, Debug)]
pub struct TestCase {
    id: usize,
    input_path: PathBuf,
    output_path: PathBuf,
}

impl TestCase {
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Read the input file's contents. Lazy: the container does not read
    /// file contents at construction time, only at call time.
    pub fn input(&self) -> Result<String> {
        Ok(std::fs::read_to_string(&self.input_path)?)
    }

    /// Read the expected-output file's contents.
    pub fn output(&self) -> Result<String> {
        Ok(std::fs::read_to_string(&self.output_path)?)
    }
}

/// An ordered collection of [`TestCase`]s enumerated from a flat directory.
#[derive(Clone, Debug, Default)]
pub struct TestCaseContainer {
    cases: Vec<TestCase>,
}

impl TestCaseContainer {
    /// Walk `directory`'s immediate entries (non-recursive), pairing each
    /// regular file whose extension is `in_ext` with a sibling of the same
    /// stem and extension `out_ext`. A missing sibling is an operational
    /// error, not a verdict. The result is sorted by input path so iteration
    /// order is deterministic regardless of the underlying directory-entry
    /// order.
    pub fn from_dir(directory: &Path, in_ext: &str, out_ext: &str) -> Result<TestCaseContainer> {
        let mut input_paths: Vec<PathBuf> = std::fs::read_dir(directory)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| has_extension(path, in_ext))
            .collect();
        input_paths.sort();

        let mut cases = Vec::with_capacity(input_paths.len());
        for (id, input_path) in input_paths.into_iter().enumerate() {
            let output_path = sibling_with_extension(&input_path, out_ext);
            if !output_path.exists() {
                bail!(ErrorKind::MalformedTestCaseDirectory(format!(
                    "{:?} has no matching {:?} sibling",
                    input_path, output_path
                )));
            }
            cases.push(TestCase {
                id,
                input_path,
                output_path,
            });
        }

        log::debug!("enumerated {} test case(s) under {:?}", cases.len(), directory);
        Ok(TestCaseContainer { cases })
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TestCase> {
        self.cases.iter()
    }

    pub fn get(&self, index: usize) -> Option<&TestCase> {
        self.cases.get(index)
    }
}

impl<'a> IntoIterator for &'a TestCaseContainer {
    type Item = &'a TestCase;
    type IntoIter = std::slice::Iter<'a, TestCase>;

    fn into_iter(self) -> Self::IntoIter {
        self.cases.iter()
    }
}

fn has_extension(path: &Path, ext: &str) -> bool {
    let ext = ext.trim_start_matches('.');
    path.extension().and_then(|e| e.to_str()) == Some(ext)
}

fn sibling_with_extension(path: &Path, ext: &str) -> PathBuf {
    path.with_extension(ext.trim_start_matches('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_matching_siblings_sorted_by_input_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("2.in"), "b").unwrap();
        std::fs::write(dir.path().join("2.out"), "b-out").unwrap();
        std::fs::write(dir.path().join("1.in"), "a").unwrap();
        std::fs::write(dir.path().join("1.out"), "a-out").unwrap();

        let container = TestCaseContainer::from_dir(dir.path(), "in", "out").unwrap();
        assert_eq!(container.len(), 2);
        assert_eq!(container.get(0).unwrap().input().unwrap(), "a");
        assert_eq!(container.get(1).unwrap().input().unwrap(), "b");
    }

    #[test]
    fn missing_sibling_is_an_operational_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("1.in"), "a").unwrap();

        let result = TestCaseContainer::from_dir(dir.path(), "in", "out");
        assert!(result.is_err());
    }

    #[test]
    fn unrelated_files_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("1.in"), "a").unwrap();
        std::fs::write(dir.path().join("1.out"), "a-out").unwrap();
        std::fs::write(dir.path().join("README.md"), "notes").unwrap();

        let container = TestCaseContainer::from_dir(dir.path(), "in", "out").unwrap();
        assert_eq!(container.len(), 1);
    }
}
