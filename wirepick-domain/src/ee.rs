//! Built-in execution environment profiles.
//!
//! Each profile lists only the packages it adds; the effective package set
//! is the union over the profile and everything it is compatible with.

use std::collections::BTreeSet;
use wirepick_types::Version;

#[derive(Debug, PartialEq, Eq)]
pub struct ExecutionEnvironment {
    pub name: &'static str,
    /// `(family, version)` for the versioned `osgi.ee` capability.
    pub family: (&'static str, Version),
    /// Directly compatible (older or smaller) environments.
    pub compatible_with: &'static [&'static str],
    pub added_packages: &'static [&'static str],
}

impl ExecutionEnvironment {
    pub fn lookup(name: &str) -> Option<&'static ExecutionEnvironment> {
        PROFILES.iter().find(|ee| ee.name == name)
    }

    pub fn all() -> &'static [ExecutionEnvironment] {
        PROFILES
    }

    /// This environment followed by every environment it is compatible with,
    /// transitively, each listed once.
    pub fn compatible(&'static self) -> Vec<&'static ExecutionEnvironment> {
        let mut out: Vec<&'static ExecutionEnvironment> = vec![self];
        let mut idx = 0;
        while idx < out.len() {
            let direct = out[idx].compatible_with;
            for name in direct {
                if let Some(ee) = Self::lookup(name)
                    && !out.iter().any(|seen| seen.name == ee.name)
                {
                    out.push(ee);
                }
            }
            idx += 1;
        }
        out
    }

    /// Reference package set, sorted.
    pub fn packages(&'static self) -> BTreeSet<&'static str> {
        self.compatible()
            .into_iter()
            .flat_map(|ee| ee.added_packages.iter().copied())
            .collect()
    }

    /// Versions per family across the compatible set, e.g.
    /// `JavaSE => [1.1, 1.2, ..., 1.6]`.
    pub fn family_versions(&'static self) -> Vec<(&'static str, Vec<Version>)> {
        let mut families: Vec<(&'static str, Vec<Version>)> = Vec::new();
        for ee in self.compatible() {
            let (family, version) = &ee.family;
            match families.iter_mut().find(|(f, _)| f == family) {
                Some((_, versions)) => versions.push(version.clone()),
                None => families.push((*family, vec![version.clone()])),
            }
        }
        for (_, versions) in families.iter_mut() {
            versions.sort();
        }
        families
    }
}

const JAVASE: &str = "JavaSE";
const MINIMUM: &str = "OSGi/Minimum";

static PROFILES: &[ExecutionEnvironment] = &[
    ExecutionEnvironment {
        name: "OSGi/Minimum-1.0",
        family: (MINIMUM, Version::new(1, 0, 0)),
        compatible_with: &[],
        added_packages: &[
            "java.io",
            "java.lang",
            "java.lang.reflect",
            "java.net",
            "java.security",
            "java.security.cert",
            "java.util",
            "java.util.jar",
            "java.util.zip",
        ],
    },
    ExecutionEnvironment {
        name: "OSGi/Minimum-1.1",
        family: (MINIMUM, Version::new(1, 1, 0)),
        compatible_with: &["OSGi/Minimum-1.0"],
        added_packages: &["java.math", "java.security.spec", "java.text"],
    },
    ExecutionEnvironment {
        name: "OSGi/Minimum-1.2",
        family: (MINIMUM, Version::new(1, 2, 0)),
        compatible_with: &["OSGi/Minimum-1.1"],
        added_packages: &["java.lang.ref", "java.security.acl", "javax.security.auth.x500"],
    },
    ExecutionEnvironment {
        name: "JRE-1.1",
        family: (JAVASE, Version::new(1, 1, 0)),
        compatible_with: &[],
        added_packages: &[
            "java.applet",
            "java.awt",
            "java.awt.datatransfer",
            "java.awt.event",
            "java.awt.image",
            "java.beans",
            "java.io",
            "java.lang",
            "java.lang.reflect",
            "java.math",
            "java.net",
            "java.rmi",
            "java.rmi.dgc",
            "java.rmi.registry",
            "java.rmi.server",
            "java.security",
            "java.security.acl",
            "java.security.interfaces",
            "java.sql",
            "java.text",
            "java.util",
            "java.util.zip",
        ],
    },
    ExecutionEnvironment {
        name: "J2SE-1.2",
        family: (JAVASE, Version::new(1, 2, 0)),
        compatible_with: &["JRE-1.1"],
        added_packages: &[
            "java.awt.color",
            "java.awt.dnd",
            "java.awt.font",
            "java.awt.geom",
            "java.awt.im",
            "java.awt.print",
            "java.lang.ref",
            "java.rmi.activation",
            "java.security.cert",
            "java.security.spec",
            "java.util.jar",
            "javax.accessibility",
            "javax.swing",
            "javax.swing.border",
            "javax.swing.colorchooser",
            "javax.swing.event",
            "javax.swing.filechooser",
            "javax.swing.plaf",
            "javax.swing.table",
            "javax.swing.text",
            "javax.swing.tree",
            "javax.swing.undo",
            "org.omg.CORBA",
        ],
    },
    ExecutionEnvironment {
        name: "J2SE-1.3",
        family: (JAVASE, Version::new(1, 3, 0)),
        compatible_with: &["J2SE-1.2", "OSGi/Minimum-1.0"],
        added_packages: &[
            "java.awt.im.spi",
            "javax.naming",
            "javax.naming.directory",
            "javax.naming.event",
            "javax.naming.ldap",
            "javax.naming.spi",
            "javax.rmi",
            "javax.rmi.CORBA",
            "javax.sound.midi",
            "javax.sound.sampled",
            "javax.transaction",
        ],
    },
    ExecutionEnvironment {
        name: "J2SE-1.4",
        family: (JAVASE, Version::new(1, 4, 0)),
        compatible_with: &["J2SE-1.3", "OSGi/Minimum-1.1"],
        added_packages: &[
            "java.nio",
            "java.nio.channels",
            "java.nio.channels.spi",
            "java.nio.charset",
            "java.nio.charset.spi",
            "java.util.logging",
            "java.util.prefs",
            "java.util.regex",
            "javax.crypto",
            "javax.crypto.interfaces",
            "javax.crypto.spec",
            "javax.imageio",
            "javax.imageio.stream",
            "javax.net",
            "javax.net.ssl",
            "javax.print",
            "javax.security.auth",
            "javax.security.auth.callback",
            "javax.security.auth.login",
            "javax.security.auth.x500",
            "javax.security.cert",
            "javax.sql",
            "javax.xml.parsers",
            "javax.xml.transform",
            "javax.xml.transform.dom",
            "javax.xml.transform.sax",
            "javax.xml.transform.stream",
            "org.ietf.jgss",
            "org.w3c.dom",
            "org.xml.sax",
            "org.xml.sax.ext",
            "org.xml.sax.helpers",
        ],
    },
    ExecutionEnvironment {
        name: "J2SE-1.5",
        family: (JAVASE, Version::new(1, 5, 0)),
        compatible_with: &["J2SE-1.4", "OSGi/Minimum-1.2"],
        added_packages: &[
            "java.lang.annotation",
            "java.lang.instrument",
            "java.lang.management",
            "java.util.concurrent",
            "java.util.concurrent.atomic",
            "java.util.concurrent.locks",
            "javax.management",
            "javax.management.remote",
            "javax.sql.rowset",
            "javax.xml.datatype",
            "javax.xml.namespace",
            "javax.xml.validation",
            "javax.xml.xpath",
        ],
    },
    ExecutionEnvironment {
        name: "JavaSE-1.6",
        family: (JAVASE, Version::new(1, 6, 0)),
        compatible_with: &["J2SE-1.5"],
        added_packages: &[
            "java.text.spi",
            "java.util.spi",
            "javax.activation",
            "javax.annotation",
            "javax.annotation.processing",
            "javax.jws",
            "javax.lang.model",
            "javax.lang.model.element",
            "javax.lang.model.type",
            "javax.lang.model.util",
            "javax.script",
            "javax.tools",
            "javax.xml.bind",
            "javax.xml.bind.annotation",
            "javax.xml.crypto",
            "javax.xml.soap",
            "javax.xml.stream",
            "javax.xml.ws",
        ],
    },
    ExecutionEnvironment {
        name: "JavaSE-1.7",
        family: (JAVASE, Version::new(1, 7, 0)),
        compatible_with: &["JavaSE-1.6"],
        added_packages: &[
            "java.lang.invoke",
            "java.nio.file",
            "java.nio.file.attribute",
            "java.nio.file.spi",
            "javax.swing.plaf.nimbus",
        ],
    },
    ExecutionEnvironment {
        name: "JavaSE-1.8",
        family: (JAVASE, Version::new(1, 8, 0)),
        compatible_with: &["JavaSE-1.7"],
        added_packages: &[
            "java.time",
            "java.time.chrono",
            "java.time.format",
            "java.time.temporal",
            "java.time.zone",
            "java.util.function",
            "java.util.stream",
        ],
    },
];
