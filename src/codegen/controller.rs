use super::context::{Context, Entity};
use super::java::{compilation_unit, import_type, Imports};
use super::Layer;
use crate::naming::{field_name, resource_path};

pub struct ControllerLayer;

impl Layer for ControllerLayer {
    fn name(&self) -> &'static str {
        "controller"
    }

    fn render(&self, ctx: &Context) -> Vec<(String, String)> {
        ctx.addressable()
            .map(|e| {
                (
                    ctx.path("controller", &e.type_name, "Controller"),
                    render_controller(ctx, e),
                )
            })
            .collect()
    }
}

fn render_controller(ctx: &Context, entity: &Entity) -> String {
    let ty = &entity.type_name;
    let dto = format!("{}DTO", ty);
    let service = format!("{}Service", field_name(ty));
    let id_type = ctx
        .id_field(&entity.table.name)
        .map(|f| f.java_type.clone())
        .unwrap_or_else(|| "Long".to_string());

    let mut imports = Imports::new();
    imports.add(ctx.import("dto", &dto));
    imports.add(ctx.import("service", &format!("{}Service", ty)));
    imports.add("org.springframework.http.HttpStatus");
    imports.add("org.springframework.web.bind.annotation.*");
    imports.add("java.util.List");
    import_type(ctx, &id_type, &mut imports);

    let mut out = String::new();
    out.push_str("@RestController\n");
    out.push_str(&format!(
        "@RequestMapping(\"{}\")\n",
        resource_path(&entity.table.name)
    ));
    out.push_str(&format!("public class {}Controller {{\n\n", ty));
    out.push_str(&format!("    private final {}Service {};\n", ty, service));
    out.push_str(&format!(
        "\n    public {}Controller({}Service {}) {{\n        this.{} = {};\n    }}\n",
        ty, ty, service, service, service
    ));

    out.push_str("\n    @GetMapping\n");
    out.push_str(&format!(
        "    public List<{}> findAll() {{\n        return {}.findAll();\n    }}\n",
        dto, service
    ));

    out.push_str("\n    @GetMapping(\"/{id}\")\n");
    out.push_str(&format!(
        "    public {} findById(@PathVariable {} id) {{\n        return {}.findById(id);\n    }}\n",
        dto, id_type, service
    ));

    out.push_str("\n    @PostMapping\n    @ResponseStatus(HttpStatus.CREATED)\n");
    out.push_str(&format!(
        "    public {} create(@RequestBody {} dto) {{\n        return {}.create(dto);\n    }}\n",
        dto, dto, service
    ));

    out.push_str("\n    @PutMapping(\"/{id}\")\n");
    out.push_str(&format!(
        "    public {} update(@PathVariable {} id, @RequestBody {} dto) {{\n        return {}.update(id, dto);\n    }}\n",
        dto, id_type, dto, service
    ));

    out.push_str("\n    @DeleteMapping(\"/{id}\")\n    @ResponseStatus(HttpStatus.NO_CONTENT)\n");
    out.push_str(&format!(
        "    public void delete(@PathVariable {} id) {{\n        {}.delete(id);\n    }}\n",
        id_type, service
    ));
    out.push_str("}\n");

    compilation_unit(&ctx.cfg.package("controller"), &imports, &out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::fixtures::*;
    use crate::naming::NamingConfig;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_controller() {
        let m = model(vec![table("order_line", vec![id_column()])], vec![]);
        let cfg = NamingConfig::new("com.acme", "shop").unwrap();
        let ctx = Context::new(&m, &cfg);
        let files = ControllerLayer.render(&ctx);

        assert_eq!(
            files[0].0,
            "src/main/java/com/acme/controller/OrderLineController.java"
        );
        let expected = r#"package com.acme.controller;

import com.acme.dto.OrderLineDTO;
import com.acme.service.OrderLineService;
import org.springframework.http.HttpStatus;
import org.springframework.web.bind.annotation.*;

import java.util.List;

@RestController
@RequestMapping("/api/order-line")
public class OrderLineController {

    private final OrderLineService orderLineService;

    public OrderLineController(OrderLineService orderLineService) {
        this.orderLineService = orderLineService;
    }

    @GetMapping
    public List<OrderLineDTO> findAll() {
        return orderLineService.findAll();
    }

    @GetMapping("/{id}")
    public OrderLineDTO findById(@PathVariable Long id) {
        return orderLineService.findById(id);
    }

    @PostMapping
    @ResponseStatus(HttpStatus.CREATED)
    public OrderLineDTO create(@RequestBody OrderLineDTO dto) {
        return orderLineService.create(dto);
    }

    @PutMapping("/{id}")
    public OrderLineDTO update(@PathVariable Long id, @RequestBody OrderLineDTO dto) {
        return orderLineService.update(id, dto);
    }

    @DeleteMapping("/{id}")
    @ResponseStatus(HttpStatus.NO_CONTENT)
    public void delete(@PathVariable Long id) {
        orderLineService.delete(id);
    }
}
"#;
        assert_eq!(files[0].1, expected);
    }
}
