//! Built-in path exclusions
//!
//! Lockfiles, vendored dependencies, generated or minified assets, binary
//! media, certificates, IDE metadata, and license/readme boilerplate carry
//! no authorship signal worth tracking; paths matching the table below are
//! dropped before any diff is applied. Dotfiles at any depth and anything
//! under a `vendor/` segment are dropped as well.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

/// One alternation per exclusion; joined into a single compiled pattern.
const EXCLUSION_PATTERNS: &[&str] = &[
    // Dependency lockfiles and manifests.
    r"Godeps",
    r"Gopkg\.lock$",
    r"Gopkg\.toml$",
    r"glide\.lock$",
    r"glide\.yaml$",
    r"(^|/)go\.mod$",
    r"(^|/)go\.sum$",
    r"Cargo\.lock$",
    r"Gemfile$",
    r"\.gemspec$",
    r"node_modules",
    r"package\.json$",
    r"package-lock\.json$",
    r"yarn\.lock$",
    r"composer\.lock$",
    // JS/TS toolchain configuration.
    r"\.webpack",
    r"\.babelrc(\.js)?$",
    r"babel\.config\.js$",
    r"\.flowconfig$",
    r"\.eslintrc(\.js|\.json)?$",
    r"\.eslintignore$",
    r"\.npmrc$",
    r"\.bowerrc$",
    r"\.jshintrc$",
    r"jsconfig\.json$",
    r"tsconfig\.json$",
    r"lerna\.json$",
    r"tslint\.(yaml|json)$",
    r"gulpfile\.js$",
    r"Gruntfile$",
    r"\.prettierignore$",
    r"mocha\.opts$",
    // Generated and minified assets.
    r"[-.]min\.js$",
    r"[-.]min\.css$",
    r"\.js\.map$",
    r"\.css\.map$",
    r"\.ipynb_checkpoints",
    r"__pycache__",
    r"\.pyc$",
    r"proguard",
    r"\.class$",
    r"\.jar$",
    // Python tooling.
    r"\.flake8$",
    r"\.pylintrc$",
    r"tox\.ini$",
    r"\.pydevproject$",
    // CI and repo plumbing.
    r"\.circleci",
    r"circle\.yml$",
    r"\.github",
    r"\.travis\.yml$",
    r"\.shippable\.yml$",
    r"\.codecov\.yml$",
    r"\.gitlab-ci\.yml$",
    r"\.drone\.yml$",
    r"appveyor\.yml$",
    r"\.codeclimate\.yml$",
    r"\.dockerignore$",
    r"\.npmignore$",
    r"Jenkinsfile$",
    r"CMakeLists\.txt$",
    r"\.cmake\.in$",
    r"Makefile\.in$",
    r"vendor/bundle",
    r"vendor/cache",
    // Documentation boilerplate.
    r"LICENSE(\.md|\.txt|\.rst)?",
    r"README(\.md|\.txt|\.rst)?",
    r"AUTHORS(\.md|\.txt|\.rst)?",
    r"CHANGELOG(\.md|\.txt|\.rst)?",
    r"CHANGES(\.md|\.txt|\.rst)?",
    r"CONTRIBUTING(\.md|\.txt|\.rst)?",
    r"CODE_OF_CONDUCT(\.md|\.txt|\.rst)?",
    r"COPYING(\.md|\.txt|\.rst)?",
    r"NOTICE(\.md|\.txt|\.rst)?",
    r"MAINTAINERS(\.md|\.txt|\.rst)?",
    r"VERSION(\.md|\.txt|\.rst)?",
    // Archives.
    r"\.(ar|zip|gz|gzip|Z|tar|bz2|bzip|cab|crx|lz|7z|nupkg)$",
    // Images, media and fonts.
    r"\.(eps|ps|gif|png|jpg|jpeg|svg|webp|bmp|ico|psd|tif|tiff|xcf|ai|sketch|icns|icc)$",
    r"\.(pdf|doc|docx|docm|dot|dotm|xls|xlsx|ppt|pptx|rtf)$",
    r"\.(mpg|mp3|mp4|ogg|avi|mov|fla|flv|midi|wmf)$",
    r"\.(ttf|woff|woff2|eot|otf)$",
    // Native build outputs.
    r"\.(a|o|dylib|dll|so|pch|tlb|pdb|ipdb|lib|la|out|app|elf|bin|deb|swf)$",
    r"\.(sqlite|mdf|sdf|ldf|ndf)$",
    // Certificates and keys.
    r"\.(pem|p12|pfx|asc|pkcs12)$",
    // IDE and editor metadata.
    r"\.(ipr|iws|iml|sln|csproj|vbproj|fsproj|dbproj|project|settings)$",
    r"\.vscode/",
    r"\.vscodeignore$",
    r"\.editorconfig$",
    r"\.mailmap$",
    r"\.coveragerc$",
    r"robots\.txt$",
    r"\.example$",
    r"\.log$",
    r"\.bak$",
];

fn exclusions() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(&EXCLUSION_PATTERNS.join("|")).expect("exclusion table must compile")
    })
}

/// Why a path was dropped from processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    DotFile,
    Vendored,
    Excluded,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::DotFile => "file was a dot file",
            SkipReason::Vendored => "file was a vendored file",
            SkipReason::Excluded => "file was on an exclusion list",
        };
        f.write_str(text)
    }
}

/// Decide whether `path` (forward-slash separated, repo-relative) should be
/// skipped, and why. `None` means the path is processed.
pub fn skip_reason(path: &str) -> Option<SkipReason> {
    let mut segments = path.split('/').peekable();
    while let Some(segment) = segments.next() {
        if segment.starts_with('.') {
            return Some(SkipReason::DotFile);
        }
        // Only a `vendor/` directory counts, not a file named vendor.
        if segment == "vendor" && segments.peek().is_some() {
            return Some(SkipReason::Vendored);
        }
    }
    if exclusions().is_match(path) {
        return Some(SkipReason::Excluded);
    }
    None
}
