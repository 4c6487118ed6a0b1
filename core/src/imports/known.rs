//! Static knowledge about Python module names.

/// Top-level modules shipped with CPython 3.x.
const STDLIB_MODULES: &[&str] = &[
    "__future__", "_thread", "abc", "aifc", "argparse", "array", "ast", "asynchat",
    "asyncio", "asyncore", "atexit", "audioop", "base64", "bdb", "binascii", "bisect",
    "builtins", "bz2", "calendar", "cgi", "cgitb", "chunk", "cmath", "cmd", "code",
    "codecs", "codeop", "collections", "colorsys", "compileall", "concurrent",
    "configparser", "contextlib", "contextvars", "copy", "copyreg", "cProfile", "crypt",
    "csv", "ctypes", "curses", "dataclasses", "datetime", "dbm", "decimal", "difflib",
    "dis", "doctest", "email", "encodings", "ensurepip", "enum", "errno", "faulthandler",
    "fcntl", "filecmp", "fileinput", "fnmatch", "fractions", "ftplib", "functools", "gc",
    "getopt", "getpass", "gettext", "glob", "graphlib", "grp", "gzip", "hashlib", "heapq",
    "hmac", "html", "http", "imaplib", "imghdr", "imp", "importlib", "inspect", "io",
    "ipaddress", "itertools", "json", "keyword", "lib2to3", "linecache", "locale",
    "logging", "lzma", "mailbox", "mailcap", "marshal", "math", "mimetypes", "mmap",
    "modulefinder", "msvcrt", "multiprocessing", "netrc", "nntplib", "numbers",
    "operator", "optparse", "os", "pathlib", "pdb", "pickle", "pickletools", "pipes",
    "pkgutil", "platform", "plistlib", "poplib", "posix", "pprint", "profile", "pstats",
    "pty", "pwd", "py_compile", "pyclbr", "pydoc", "queue", "quopri", "random", "re",
    "readline", "reprlib", "resource", "rlcompleter", "runpy", "sched", "secrets",
    "select", "selectors", "shelve", "shlex", "shutil", "signal", "site", "smtplib",
    "sndhdr", "socket", "socketserver", "sqlite3", "ssl", "stat", "statistics", "string",
    "stringprep", "struct", "subprocess", "sunau", "symtable", "sys", "sysconfig",
    "syslog", "tabnanny", "tarfile", "telnetlib", "tempfile", "termios", "textwrap",
    "threading", "time", "timeit", "tkinter", "token", "tokenize", "tomllib", "trace",
    "traceback", "tracemalloc", "tty", "turtle", "types", "typing", "unicodedata",
    "unittest", "urllib", "uu", "uuid", "venv", "warnings", "wave", "weakref",
    "webbrowser", "winreg", "winsound", "wsgiref", "xdrlib", "xml", "xmlrpc", "zipapp",
    "zipfile", "zipimport", "zlib", "zoneinfo",
];

/// Import names whose distribution is published under a different name.
/// When several distributions provide the module, any of them satisfies it.
const DISTRIBUTION_ALIASES: &[(&str, &[&str])] = &[
    ("rest_framework", &["djangorestframework"]),
    ("rest_framework_simplejwt", &["djangorestframework-simplejwt"]),
    ("django_filters", &["django-filter"]),
    ("drf_spectacular", &["drf-spectacular"]),
    ("elasticsearch_dsl", &["elasticsearch-dsl"]),
    ("django_elasticsearch_dsl", &["django-elasticsearch-dsl"]),
    ("haystack", &["django-haystack"]),
    ("watson", &["django-watson"]),
    ("guardian", &["django-guardian"]),
    ("ckeditor", &["django-ckeditor"]),
    ("ckeditor_uploader", &["django-ckeditor"]),
    ("django_ratelimit", &["django-ratelimit"]),
    ("ratelimit", &["django-ratelimit"]),
    ("channels_redis", &["channels-redis"]),
    ("corsheaders", &["django-cors-headers"]),
    ("django_celery_results", &["django-celery-results"]),
    ("django_celery_beat", &["django-celery-beat"]),
    ("debug_toolbar", &["django-debug-toolbar"]),
    ("django_extensions", &["django-extensions"]),
    ("storages", &["django-storages"]),
    ("environ", &["django-environ"]),
    ("taggit", &["django-taggit"]),
    ("mptt", &["django-mptt"]),
    ("allauth", &["django-allauth"]),
    ("psycopg2", &["psycopg2", "psycopg2-binary"]),
    ("psycopg", &["psycopg", "psycopg-binary"]),
    ("yaml", &["PyYAML"]),
    ("PIL", &["Pillow"]),
    ("dateutil", &["python-dateutil"]),
    ("dotenv", &["python-dotenv"]),
    ("decouple", &["python-decouple"]),
    ("jwt", &["PyJWT"]),
    ("bs4", &["beautifulsoup4"]),
    ("magic", &["python-magic"]),
    ("attr", &["attrs"]),
    ("sklearn", &["scikit-learn"]),
    ("cv2", &["opencv-python", "opencv-python-headless"]),
];

pub fn is_stdlib(module: &str) -> bool {
    STDLIB_MODULES.contains(&module)
}

/// Distributions known to provide `module`, if it is aliased.
pub fn builtin_distributions(module: &str) -> Option<&'static [&'static str]> {
    DISTRIBUTION_ALIASES
        .iter()
        .find(|(name, _)| *name == module)
        .map(|(_, dists)| *dists)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stdlib_lookup() {
        assert!(is_stdlib("uuid"));
        assert!(is_stdlib("difflib"));
        assert!(!is_stdlib("django"));
    }

    #[test]
    fn alias_lookup() {
        assert_eq!(builtin_distributions("rest_framework"), Some(&["djangorestframework"][..]));
        assert_eq!(builtin_distributions("psycopg2").map(<[_]>::len), Some(2));
        assert!(builtin_distributions("django").is_none());
    }
}
