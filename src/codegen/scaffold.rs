//! Build and bootstrap files around the generated layers.

use super::CodeBundle;
use crate::ir::PhysicalModel;
use crate::naming::NamingConfig;
use crate::sql::{self, Dialect};

const SPRING_BOOT_VERSION: &str = "3.3.4";
const JAVA_VERSION: &str = "17";

/// JDBC driver coordinates and connection URL per dialect.
fn datasource(dialect: Dialect, database: &str) -> (&'static str, &'static str, String) {
    match dialect {
        Dialect::PostgreSQL => (
            "org.postgresql",
            "postgresql",
            format!("jdbc:postgresql://localhost:5432/{}", database),
        ),
        Dialect::MySQL => (
            "com.mysql",
            "mysql-connector-j",
            format!("jdbc:mysql://localhost:3306/{}", database),
        ),
        Dialect::Generic => (
            "com.h2database",
            "h2",
            format!("jdbc:h2:mem:{}", database),
        ),
    }
}

fn pom(cfg: &NamingConfig, dialect: Dialect) -> String {
    let (driver_group, driver_artifact, _) = datasource(dialect, cfg.project_name());
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<project xmlns=\"http://maven.apache.org/POM/4.0.0\"\n");
    out.push_str("         xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\"\n");
    out.push_str("         xsi:schemaLocation=\"http://maven.apache.org/POM/4.0.0 https://maven.apache.org/xsd/maven-4.0.0.xsd\">\n");
    out.push_str("    <modelVersion>4.0.0</modelVersion>\n\n");
    out.push_str("    <parent>\n");
    out.push_str("        <groupId>org.springframework.boot</groupId>\n");
    out.push_str("        <artifactId>spring-boot-starter-parent</artifactId>\n");
    out.push_str(&format!("        <version>{}</version>\n", SPRING_BOOT_VERSION));
    out.push_str("        <relativePath/>\n");
    out.push_str("    </parent>\n\n");
    out.push_str(&format!("    <groupId>{}</groupId>\n", cfg.base_package()));
    out.push_str(&format!("    <artifactId>{}</artifactId>\n", cfg.project_name()));
    out.push_str("    <version>0.0.1-SNAPSHOT</version>\n");
    out.push_str(&format!("    <name>{}</name>\n\n", cfg.project_name()));
    out.push_str("    <properties>\n");
    out.push_str(&format!("        <java.version>{}</java.version>\n", JAVA_VERSION));
    out.push_str("    </properties>\n\n");
    out.push_str("    <dependencies>\n");
    for artifact in ["spring-boot-starter-web", "spring-boot-starter-data-jpa"] {
        out.push_str("        <dependency>\n");
        out.push_str("            <groupId>org.springframework.boot</groupId>\n");
        out.push_str(&format!("            <artifactId>{}</artifactId>\n", artifact));
        out.push_str("        </dependency>\n");
    }
    out.push_str("        <dependency>\n");
    out.push_str(&format!("            <groupId>{}</groupId>\n", driver_group));
    out.push_str(&format!("            <artifactId>{}</artifactId>\n", driver_artifact));
    out.push_str("            <scope>runtime</scope>\n");
    out.push_str("        </dependency>\n");
    out.push_str("        <dependency>\n");
    out.push_str("            <groupId>org.springframework.boot</groupId>\n");
    out.push_str("            <artifactId>spring-boot-starter-test</artifactId>\n");
    out.push_str("            <scope>test</scope>\n");
    out.push_str("        </dependency>\n");
    out.push_str("    </dependencies>\n\n");
    out.push_str("    <build>\n        <plugins>\n            <plugin>\n");
    out.push_str("                <groupId>org.springframework.boot</groupId>\n");
    out.push_str("                <artifactId>spring-boot-maven-plugin</artifactId>\n");
    out.push_str("            </plugin>\n        </plugins>\n    </build>\n");
    out.push_str("</project>\n");
    out
}

fn application_class(cfg: &NamingConfig) -> String {
    let class = cfg.application_class();
    format!(
        "package {};

import org.springframework.boot.SpringApplication;
import org.springframework.boot.autoconfigure.SpringBootApplication;

@SpringBootApplication
public class {} {{

    public static void main(String[] args) {{
        SpringApplication.run({}.class, args);
    }}
}}
",
        cfg.base_package(),
        class,
        class
    )
}

fn application_properties(cfg: &NamingConfig, dialect: Dialect) -> String {
    let database = cfg.project_name().replace('-', "_");
    let (_, _, url) = datasource(dialect, &database);
    let mut out = String::new();
    out.push_str(&format!("spring.application.name={}\n", cfg.project_name()));
    out.push_str(&format!("spring.datasource.url={}\n", url));
    if dialect != Dialect::Generic {
        out.push_str("spring.datasource.username=\n");
        out.push_str("spring.datasource.password=\n");
    }
    out.push_str("spring.jpa.hibernate.ddl-auto=none\n");
    out.push_str("spring.jpa.open-in-view=false\n");
    out.push_str("spring.sql.init.mode=always\n");
    out
}

/// Maven project files, the application entry point and the schema script.
pub fn scaffold(model: &PhysicalModel, cfg: &NamingConfig, dialect: Dialect) -> CodeBundle {
    let mut bundle = CodeBundle::new();
    bundle.insert("pom.xml", pom(cfg, dialect));
    bundle.insert(
        format!("{}/{}.java", cfg.source_root(), cfg.application_class()),
        application_class(cfg),
    );
    bundle.insert(
        "src/main/resources/application.properties",
        application_properties(cfg, dialect),
    );
    bundle.insert(
        "src/main/resources/schema.sql",
        sql::emit_with_dialect(model, dialect),
    );
    bundle
}
