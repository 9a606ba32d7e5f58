//! Python standard-library module names.
//!
//! An embedded list of top-level modules; imports whose first component is
//! not in it are reported as third-party dependencies.

static PYTHON_STDLIB: phf::Set<&'static str> = phf::phf_set! {
    "__future__", "abc", "argparse", "array", "ast", "asyncio", "atexit", "base64",
    "bisect", "builtins", "bz2", "calendar", "cmath", "codecs", "collections",
    "concurrent", "configparser", "contextlib", "contextvars", "copy", "csv",
    "ctypes", "dataclasses", "datetime", "decimal", "difflib", "dis", "email",
    "enum", "errno", "fnmatch", "fractions", "functools", "gc", "getpass",
    "gettext", "glob", "gzip", "hashlib", "heapq", "hmac", "html", "http",
    "importlib", "inspect", "io", "ipaddress", "itertools", "json", "keyword",
    "locale", "logging", "lzma", "math", "mimetypes", "multiprocessing",
    "numbers", "operator", "os", "pathlib", "pickle", "platform", "pprint",
    "queue", "random", "re", "secrets", "select", "shelve", "shlex", "shutil",
    "signal", "socket", "sqlite3", "ssl", "stat", "statistics", "string",
    "struct", "subprocess", "sys", "tarfile", "tempfile", "textwrap",
    "threading", "time", "timeit", "tkinter", "token", "tokenize", "traceback",
    "types", "typing", "unicodedata", "unittest", "urllib", "uuid", "venv",
    "warnings", "weakref", "xml", "zipfile", "zlib", "zoneinfo",
};

/// Whether the first dotted component of `module` is a stdlib module.
pub fn is_stdlib(module: &str) -> bool {
    let base = module.split('.').next().unwrap_or(module);
    PYTHON_STDLIB.contains(base)
}

/// Imports that are not part of the standard library, in input order.
pub fn dependencies(imports: &[String]) -> Vec<String> {
    imports
        .iter()
        .filter(|imp| !is_stdlib(imp))
        .cloned()
        .collect()
}
