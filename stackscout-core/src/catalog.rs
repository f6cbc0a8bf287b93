//! Static pattern catalogs driving the signal extractors.
//!
//! Catalogs are built once at process start and passed by reference into
//! each extractor; nothing here is mutated after construction. Matching is
//! case-insensitive substring containment, first-match-wins in declaration
//! order.

/// A named, ordered list of trigger phrases.
#[derive(Debug, Clone)]
pub struct PatternCatalog {
    name: &'static str,
    patterns: &'static [&'static str],
}

impl PatternCatalog {
    pub const fn new(name: &'static str, patterns: &'static [&'static str]) -> Self {
        Self { name, patterns }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn patterns(&self) -> &'static [&'static str] {
        self.patterns
    }

    /// First trigger phrase contained in `text`, case-insensitive.
    ///
    /// The scan stops at the first hit so a single artifact contributes at
    /// most one match per catalog.
    pub fn first_match(&self, text: &str) -> Option<&'static str> {
        let lower = text.to_lowercase();
        self.patterns
            .iter()
            .copied()
            .find(|p| lower.contains(&p.to_lowercase()))
    }
}

/// The three comment-mining catalogs.
#[derive(Debug, Clone)]
pub struct Catalogs {
    pub confusion: PatternCatalog,
    pub tech_debt: PatternCatalog,
    pub fragility: PatternCatalog,
    pub reverts: PatternCatalog,
}

impl Catalogs {
    pub fn builtin() -> Self {
        Self {
            confusion: PatternCatalog::new("confusion", CONFUSION_PATTERNS),
            tech_debt: PatternCatalog::new("tech_debt", TECH_DEBT_PATTERNS),
            fragility: PatternCatalog::new("fragility", FRAGILITY_PATTERNS),
            reverts: PatternCatalog::new("reverts", REVERT_PATTERNS),
        }
    }
}

impl Default for Catalogs {
    fn default() -> Self {
        Self::builtin()
    }
}

const CONFUSION_PATTERNS: &[&str] = &[
    "why does",
    "why is this",
    "not sure",
    "no idea",
    "don't understand",
    "dont understand",
    "confusing",
    "unclear",
    "what is this",
    "how does this work",
];

const TECH_DEBT_PATTERNS: &[&str] = &[
    "technical debt",
    "tech debt",
    "workaround",
    "quick fix",
    "band-aid",
    "bandaid",
    "kludge",
    "hack",
    "temporary",
    "fixme",
];

const FRAGILITY_PATTERNS: &[&str] = &[
    "don't touch",
    "dont touch",
    "be careful",
    "fragile",
    "breaks easily",
    "might break",
    "dangerous",
    "risky",
    "magic",
    "here be dragons",
];

const REVERT_PATTERNS: &[&str] = &[
    "revert",
    "rollback",
    "roll back",
    "back out",
    "backing out",
    "undo",
];

/// The ten fixed code-fear search phrases.
pub const FEAR_PHRASES: &[&str] = &[
    "DO NOT TOUCH",
    "DO NOT REMOVE",
    "DO NOT CHANGE",
    "DO NOT DELETE",
    "HERE BE DRAGONS",
    "FRAGILE",
    "DANGER",
    "XXX",
    "HACK:",
    "load bearing",
];

/// Suspicious words flagging env var names and shell script filenames.
pub const SUSPICIOUS_WORDS: &[&str] = &[
    "hack",
    "legacy",
    "temp",
    "tmp",
    "dont",
    "do_not",
    "workaround",
    "fixme",
    "broken",
    "deprecated",
];

/// Environment variable buckets; a key may land in several.
pub const ENV_BUCKETS: &[(&str, &[&str])] = &[
    ("database", &["db_", "database", "postgres", "mysql", "mongo", "sql"]),
    ("cache", &["redis", "cache", "memcache"]),
    ("cloud", &["aws_", "s3_", "gcp_", "azure_", "cloud"]),
    (
        "auth",
        &["auth", "token", "secret", "password", "api_key", "jwt", "oauth"],
    ),
    (
        "observability",
        &["sentry", "datadog", "log_", "metric", "trace", "monitor"],
    ),
    (
        "feature_flag",
        &["feature_", "flag_", "enable_", "disable_", "ff_"],
    ),
];

/// Compose service-name keywords for stack booleans.
pub const DATABASE_SERVICES: &[&str] = &["postgres", "mysql", "mariadb", "mongo", "db"];
pub const CACHE_SERVICES: &[&str] = &["redis", "memcache", "cache"];
pub const QUEUE_SERVICES: &[&str] = &["rabbit", "kafka", "nats", "sqs", "celery", "queue"];

/// Files that define the stack, in priority order: (path, category).
pub const CRITICAL_FILES: &[(&str, &str)] = &[
    // Dependencies
    ("package.json", "nodejs_deps"),
    ("package-lock.json", "nodejs_lock"),
    ("requirements.txt", "python_deps"),
    ("Pipfile", "python_pipfile"),
    ("pyproject.toml", "python_project"),
    ("go.mod", "go_deps"),
    ("go.sum", "go_lock"),
    ("Gemfile", "ruby_deps"),
    ("Cargo.toml", "rust_deps"),
    ("pom.xml", "java_maven"),
    ("build.gradle", "java_gradle"),
    ("composer.json", "php_deps"),
    // Infrastructure
    ("Dockerfile", "docker"),
    ("docker-compose.yml", "docker_compose"),
    ("docker-compose.yaml", "docker_compose"),
    ("kubernetes.yml", "k8s"),
    ("kubernetes.yaml", "k8s"),
    // IaC
    ("terraform.tfvars", "terraform_vars"),
    ("main.tf", "terraform_main"),
    ("variables.tf", "terraform_vars_def"),
    // CI/CD
    (".gitlab-ci.yml", "gitlab_ci"),
    ("Jenkinsfile", "jenkins"),
    (".circleci/config.yml", "circleci"),
    // Cloud/Platform
    ("Procfile", "heroku"),
    ("app.json", "heroku_config"),
    ("vercel.json", "vercel"),
    ("netlify.toml", "netlify"),
    // Docs
    ("README.md", "readme"),
    ("CONTRIBUTING.md", "contributing"),
];

/// Candidate compose manifest filenames, tried in order.
pub const COMPOSE_FILES: &[&str] = &[
    "docker-compose.yml",
    "docker-compose.yaml",
    "compose.yml",
    "compose.yaml",
];

/// Directories searched for Kubernetes manifests.
pub const K8S_DIRS: &[&str] = &["k8s", "kubernetes", "manifests", "deploy"];
